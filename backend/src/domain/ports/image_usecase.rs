//! Driving port for image operations.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Comment, CommentDraft, Error, Image, ImageUpload, Like, UserId};

/// Image upload, retrieval and social interactions.
///
/// Any authenticated user may view, like and comment on any image; only the
/// uploader may delete it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageUsecase: Send + Sync {
    /// Validate, store bytes and record metadata.
    async fn upload(&self, user_id: &UserId, upload: ImageUpload) -> Result<Image, Error>;

    /// Load image metadata.
    async fn get(&self, id: Uuid) -> Result<Image, Error>;

    /// Load image metadata and bytes.
    async fn content(&self, id: Uuid) -> Result<(Image, Vec<u8>), Error>;

    /// Page through the caller's uploads.
    async fn list(&self, user_id: &UserId, page: PageRequest) -> Result<Page<Image>, Error>;

    /// Delete one of the caller's images.
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<(), Error>;

    /// Like an image. Liking twice is a conflict.
    async fn like(&self, user_id: &UserId, image_id: Uuid) -> Result<Like, Error>;

    /// Remove the caller's like.
    async fn unlike(&self, user_id: &UserId, image_id: Uuid) -> Result<(), Error>;

    /// Comment on an image.
    async fn comment(
        &self,
        user_id: &UserId,
        image_id: Uuid,
        draft: CommentDraft,
    ) -> Result<Comment, Error>;

    /// Page through an image's comments.
    async fn comments(&self, image_id: Uuid, page: PageRequest) -> Result<Page<Comment>, Error>;
}
