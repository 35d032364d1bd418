//! Port for image metadata, likes and comments.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Comment, Image, Like, UserId};

use super::RepositoryError;

/// Port for image metadata and the social tables hanging off it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Insert image metadata.
    async fn create(&self, image: &Image) -> Result<(), RepositoryError>;

    /// Load image metadata regardless of owner.
    async fn find(&self, id: Uuid) -> Result<Option<Image>, RepositoryError>;

    /// Page through the images uploaded by `user_id`, newest first.
    async fn list_by_owner(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Image>, RepositoryError>;

    /// Delete an image with its likes and comments, matching on owner.
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError>;

    /// Record a like. A second like by the same user yields
    /// [`RepositoryError::Conflict`].
    async fn add_like(&self, like: &Like) -> Result<(), RepositoryError>;

    /// Remove a like. Returns `false` when there was none.
    async fn remove_like(&self, image_id: Uuid, user_id: &UserId)
    -> Result<bool, RepositoryError>;

    /// Record a comment.
    async fn add_comment(&self, comment: &Comment) -> Result<(), RepositoryError>;

    /// Page through an image's comments, oldest first.
    async fn list_comments(
        &self,
        image_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepositoryError>;

    /// Recompute `like_count` and `comment_count` from the source tables.
    /// Idempotent; missing images are ignored.
    async fn refresh_counters(&self, image_id: Uuid) -> Result<(), RepositoryError>;
}
