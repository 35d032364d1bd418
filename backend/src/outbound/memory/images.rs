use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{ImageRepository, RepositoryError};
use crate::domain::{Comment, Image, Like, UserId};

use super::{lock, paginate};

#[derive(Default)]
struct ImageTables {
    images: HashMap<Uuid, Image>,
    likes: HashMap<(Uuid, UserId), Like>,
    comments: HashMap<Uuid, Comment>,
}

/// In-memory image, like and comment storage.
///
/// Counters on stored images only move when
/// [`refresh_counters`](ImageRepository::refresh_counters) runs, matching the
/// consumer-driven behaviour of the SQL adapter.
#[derive(Default)]
pub struct InMemoryImageRepository {
    tables: Mutex<ImageTables>,
}

impl InMemoryImageRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn create(&self, image: &Image) -> Result<(), RepositoryError> {
        let mut tables = lock(&self.tables);
        if tables.images.contains_key(&image.id) {
            return Err(RepositoryError::conflict("images_pkey"));
        }
        tables.images.insert(image.id, image.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Image>, RepositoryError> {
        Ok(lock(&self.tables).images.get(&id).cloned())
    }

    async fn list_by_owner(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Image>, RepositoryError> {
        let owned = lock(&self.tables)
            .images
            .values()
            .filter(|i| i.user_id == *user_id)
            .cloned()
            .collect();
        Ok(paginate(owned, page, |i: &Image| (i.created_at, i.id)))
    }

    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError> {
        let mut tables = lock(&self.tables);
        if !tables.images.get(&id).is_some_and(|i| i.user_id == *user_id) {
            return Ok(false);
        }
        tables.images.remove(&id);
        tables.likes.retain(|(image_id, _), _| *image_id != id);
        tables.comments.retain(|_, c| c.image_id != id);
        Ok(true)
    }

    async fn add_like(&self, like: &Like) -> Result<(), RepositoryError> {
        let mut tables = lock(&self.tables);
        let key = (like.image_id, like.user_id);
        if tables.likes.contains_key(&key) {
            return Err(RepositoryError::conflict("likes_pkey"));
        }
        tables.likes.insert(key, like.clone());
        Ok(())
    }

    async fn remove_like(&self, image_id: Uuid, user_id: &UserId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.tables)
            .likes
            .remove(&(image_id, *user_id))
            .is_some())
    }

    async fn add_comment(&self, comment: &Comment) -> Result<(), RepositoryError> {
        let mut tables = lock(&self.tables);
        if tables.comments.contains_key(&comment.id) {
            return Err(RepositoryError::conflict("comments_pkey"));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn list_comments(
        &self,
        image_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepositoryError> {
        let matching = lock(&self.tables)
            .comments
            .values()
            .filter(|c| c.image_id == image_id)
            .cloned()
            .collect();
        Ok(paginate(matching, page, |c: &Comment| (c.created_at, c.id)))
    }

    async fn refresh_counters(&self, image_id: Uuid) -> Result<(), RepositoryError> {
        let mut tables = lock(&self.tables);
        let likes = tables.likes.keys().filter(|(id, _)| *id == image_id).count();
        let comments = tables
            .comments
            .values()
            .filter(|c| c.image_id == image_id)
            .count();
        if let Some(image) = tables.images.get_mut(&image_id) {
            image.like_count = i64::try_from(likes).unwrap_or(i64::MAX);
            image.comment_count = i64::try_from(comments).unwrap_or(i64::MAX);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommentDraft, ImageUpload};
    use chrono::Utc;
    use rstest::rstest;

    fn image(owner: UserId) -> Image {
        Image::create(
            owner,
            &ImageUpload {
                title: None,
                content_type: "image/gif".to_owned(),
                bytes: vec![1, 2, 3],
            },
            Utc::now(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn counters_follow_refresh_not_writes() {
        let repo = InMemoryImageRepository::new();
        let owner = UserId::random();
        let stored = image(owner);
        repo.create(&stored).await.expect("insert");

        for _ in 0..2 {
            let like = Like {
                image_id: stored.id,
                user_id: UserId::random(),
                created_at: Utc::now(),
            };
            repo.add_like(&like).await.expect("like");
        }
        let comment = Comment::create(
            stored.id,
            owner,
            CommentDraft {
                text: "nice".to_owned(),
            },
            Utc::now(),
        );
        repo.add_comment(&comment).await.expect("comment");

        let before = repo.find(stored.id).await.expect("find").expect("exists");
        assert_eq!((before.like_count, before.comment_count), (0, 0));

        repo.refresh_counters(stored.id).await.expect("refresh");
        repo.refresh_counters(stored.id).await.expect("refresh is idempotent");
        let after = repo.find(stored.id).await.expect("find").expect("exists");
        assert_eq!((after.like_count, after.comment_count), (2, 1));
    }

    #[rstest]
    #[tokio::test]
    async fn second_like_by_same_user_conflicts() {
        let repo = InMemoryImageRepository::new();
        let like = Like {
            image_id: Uuid::new_v4(),
            user_id: UserId::random(),
            created_at: Utc::now(),
        };
        repo.add_like(&like).await.expect("first like");
        let error = repo.add_like(&like).await.expect_err("duplicate");
        assert!(matches!(error, RepositoryError::Conflict { .. }));
    }
}
