//! OpenAPI schema definitions for the response envelope.
//!
//! [`Envelope`](super::envelope::Envelope) is generic and serialised as-is;
//! the documentation needs one concrete schema per payload, which
//! `envelope_schema!` stamps out. `Paging` comes from the `pagination` crate
//! and is mirrored here so that crate stays free of `utoipa`.

use utoipa::ToSchema;

use super::addresses::AddressResponse;
use super::contacts::ContactResponse;
use super::images::{CommentResponse, ImageResponse, LikeResponse};
use super::todos::TodoResponse;
use super::users::{TokenResponse, UserResponse};

/// OpenAPI schema for [`pagination::Paging`].
#[derive(ToSchema)]
#[schema(as = Paging)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PagingSchema {
    /// 1-based page number.
    #[schema(example = 1)]
    page: u32,
    /// Items per page.
    #[schema(example = 10)]
    size: u32,
    /// Items matching the query across all pages.
    #[schema(example = 42)]
    total_item: u64,
    /// `ceil(total_item / size)`.
    #[schema(example = 5)]
    total_page: u64,
}

/// Envelope returned by failed requests.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorEnvelope {
    /// Always `null` on failure.
    #[schema(value_type = Option<Object>)]
    data: Option<serde_json::Value>,
    /// Always `null` on failure.
    paging: Option<PagingSchema>,
    /// Client-facing message.
    #[schema(example = "validation failed")]
    error_message: String,
    /// Per-field or per-cause detail lines.
    error_detail: Vec<String>,
}

/// Envelope returned by successful requests without a payload.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EmptyEnvelope {
    #[schema(value_type = Option<Object>)]
    data: Option<serde_json::Value>,
    paging: Option<PagingSchema>,
    /// Always empty on success.
    error_message: String,
    error_detail: Vec<String>,
}

macro_rules! envelope_schema {
    ($($name:ident => $data:ty),* $(,)?) => {
        $(
            #[doc = concat!("Envelope carrying `", stringify!($data), "`.")]
            #[derive(ToSchema)]
            #[expect(
                dead_code,
                reason = "Used only for OpenAPI schema generation via utoipa"
            )]
            pub struct $name {
                data: $data,
                paging: Option<PagingSchema>,
                /// Always empty on success.
                error_message: String,
                error_detail: Vec<String>,
            }
        )*
    };
}

envelope_schema! {
    UserEnvelope => UserResponse,
    TokenEnvelope => TokenResponse,
    ContactEnvelope => ContactResponse,
    ContactPageEnvelope => Vec<ContactResponse>,
    AddressEnvelope => AddressResponse,
    AddressPageEnvelope => Vec<AddressResponse>,
    TodoEnvelope => TodoResponse,
    TodoPageEnvelope => Vec<TodoResponse>,
    ImageEnvelope => ImageResponse,
    ImagePageEnvelope => Vec<ImageResponse>,
    LikeEnvelope => LikeResponse,
    CommentEnvelope => CommentResponse,
    CommentPageEnvelope => Vec<CommentResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn property_names(schema: utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>) -> Vec<String> {
        match schema {
            utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(object)) => {
                object.properties.keys().cloned().collect()
            }
            other => panic!("expected object schema, got {other:?}"),
        }
    }

    #[rstest]
    fn envelopes_expose_all_four_keys() {
        for names in [
            property_names(ContactPageEnvelope::schema()),
            property_names(ErrorEnvelope::schema()),
        ] {
            for key in ["data", "paging", "error_message", "error_detail"] {
                assert!(names.iter().any(|name| name == key), "missing {key}");
            }
        }
    }

    #[rstest]
    fn paging_uses_snake_case_keys() {
        let names = property_names(PagingSchema::schema());
        assert_eq!(names, ["page", "size", "total_item", "total_page"]);
    }
}
