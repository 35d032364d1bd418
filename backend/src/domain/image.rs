//! Uploaded images and the likes and comments attached to them.
//!
//! Image bytes live in an [`ImageStore`](super::ports::ImageStore); the
//! database only keeps metadata and the storage key. `like_count` and
//! `comment_count` are denormalised counters refreshed by the likes/comments
//! consumers, so they trail the source tables until the next batch lands.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Error, UserId, Validator};

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted content types and the file extension used for storage keys.
const CONTENT_TYPES: [(&str, &str); 4] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

fn extension_for(content_type: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// Image metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub id: Uuid,
    pub user_id: UserId,
    pub title: Option<String>,
    pub content_type: String,
    pub size_bytes: i64,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw upload as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub title: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check title length, content type and size.
    pub fn validate(&self) -> Result<(), Error> {
        let mut validator = Validator::new();
        validator
            .optional("title", self.title.as_deref(), 100)
            .ensure(
                extension_for(&self.content_type).is_some(),
                "content_type",
                "must be one of image/png, image/jpeg, image/gif, image/webp",
            )
            .ensure(!self.bytes.is_empty(), "content", "must not be empty")
            .ensure(
                self.bytes.len() <= MAX_IMAGE_BYTES,
                "content",
                "must be at most 5 MiB",
            );
        validator.finish()
    }
}

impl Image {
    /// Build metadata for a validated upload.
    pub fn create(user_id: UserId, upload: &ImageUpload, now: DateTime<Utc>) -> Self {
        let id = Uuid::new_v4();
        let extension = extension_for(&upload.content_type).unwrap_or("bin");
        Self {
            id,
            user_id,
            title: upload.title.clone(),
            content_type: upload.content_type.clone(),
            size_bytes: i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX),
            storage_key: format!("{id}.{extension}"),
            like_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user's like on an image. At most one per `(image_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Like {
    pub image_id: Uuid,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Comment left on an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub image_id: Uuid,
    pub user_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Writable comment fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDraft {
    pub text: String,
}

impl CommentDraft {
    /// Check comment length.
    pub fn validate(&self) -> Result<(), Error> {
        let mut validator = Validator::new();
        validator.required("text", &self.text, 500);
        validator.finish()
    }
}

impl Comment {
    /// Materialise a comment from a validated draft.
    pub fn create(
        image_id: Uuid,
        user_id: UserId,
        draft: CommentDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_id,
            user_id,
            text: draft.text,
            created_at: now,
        }
    }
}
