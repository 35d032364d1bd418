//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. `diesel
//! print-schema` against a migrated database regenerates them.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        name -> Varchar,
        password_hash -> Text,
        /// SHA-256 fingerprint of the live bearer token, if logged in.
        token_fingerprint -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    contacts (id) {
        id -> Uuid,
        user_id -> Uuid,
        first_name -> Varchar,
        last_name -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    addresses (id) {
        id -> Uuid,
        contact_id -> Uuid,
        street -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        province -> Nullable<Varchar>,
        country -> Varchar,
        postal_code -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    todos (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        description -> Nullable<Varchar>,
        is_completed -> Bool,
        completed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Image metadata. Bytes live in the image store under `storage_key`.
    images (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Nullable<Varchar>,
        content_type -> Varchar,
        size_bytes -> Int8,
        storage_key -> Varchar,
        /// Denormalised; refreshed by the likes consumer.
        like_count -> Int8,
        /// Denormalised; refreshed by the comments consumer.
        comment_count -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    likes (image_id, user_id) {
        image_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    comments (id) {
        id -> Uuid,
        image_id -> Uuid,
        user_id -> Uuid,
        text -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(contacts -> users (user_id));
diesel::joinable!(addresses -> contacts (contact_id));
diesel::joinable!(todos -> users (user_id));
diesel::joinable!(images -> users (user_id));
diesel::joinable!(likes -> images (image_id));
diesel::joinable!(comments -> images (image_id));

diesel::allow_tables_to_appear_in_same_query!(
    users, contacts, addresses, todos, images, likes, comments,
);
