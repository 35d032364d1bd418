//! Image service implementing [`ImageUsecase`].
//!
//! Uploads write the bytes first and the metadata second. If the metadata
//! insert fails the stored object is removed on a best-effort basis; a
//! leftover object is harmless because nothing references its key.
//!
//! Likes and comments are announced on their own topics keyed by image id.
//! The counters on [`Image`] are refreshed by the consumers, not here.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::ports::{
    EventPublisher, ImageRepository, ImageStore, ImageUsecase, RepositoryError,
};
use super::service_support::{publish, repository_fault, storage_fault};
use super::{
    Comment, CommentDraft, Error, EventKind, Image, ImageUpload, Like, Topic, UserId,
};

/// Image service.
#[derive(Clone)]
pub struct ImageService {
    images: Arc<dyn ImageRepository>,
    store: Arc<dyn ImageStore>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ImageService {
    /// Create the service from its collaborators.
    pub fn new(
        images: Arc<dyn ImageRepository>,
        store: Arc<dyn ImageStore>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            images,
            store,
            publisher,
            clock,
        }
    }

    async fn discard_content(&self, key: &str) {
        if let Err(err) = self.store.delete(key).await {
            warn!(storage_key = key, error = %err, "failed to remove image content");
        }
    }
}

#[async_trait]
impl ImageUsecase for ImageService {
    async fn upload(&self, user_id: &UserId, upload: ImageUpload) -> Result<Image, Error> {
        upload.validate()?;
        let image = Image::create(*user_id, &upload, self.clock.utc());
        self.store
            .put(&image.storage_key, upload.bytes)
            .await
            .map_err(|err| storage_fault("store image content", err))?;

        if let Err(err) = self.images.create(&image).await {
            self.discard_content(&image.storage_key).await;
            return Err(repository_fault("insert image", err).into());
        }

        publish(
            self.publisher.as_ref(),
            Topic::Images,
            image.id,
            EventKind::Created,
            image.created_at,
            &image,
        )
        .await?;
        Ok(image)
    }

    async fn get(&self, id: Uuid) -> Result<Image, Error> {
        self.images
            .find(id)
            .await
            .map_err(|err| repository_fault("find image", err))?
            .ok_or_else(|| Error::not_found("image not found"))
    }

    async fn content(&self, id: Uuid) -> Result<(Image, Vec<u8>), Error> {
        let image = self.get(id).await?;
        let bytes = self
            .store
            .get(&image.storage_key)
            .await
            .map_err(|err| storage_fault("read image content", err))?;
        Ok((image, bytes))
    }

    async fn list(&self, user_id: &UserId, page: PageRequest) -> Result<Page<Image>, Error> {
        Ok(self
            .images
            .list_by_owner(user_id, page)
            .await
            .map_err(|err| repository_fault("list images", err))?)
    }

    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<(), Error> {
        let image = self.get(id).await?;
        if image.user_id != *user_id {
            return Err(Error::forbidden("image belongs to another user"));
        }

        let deleted = self
            .images
            .delete(user_id, id)
            .await
            .map_err(|err| repository_fault("delete image", err))?;
        if !deleted {
            return Err(Error::not_found("image not found"));
        }
        self.discard_content(&image.storage_key).await;

        publish(
            self.publisher.as_ref(),
            Topic::Images,
            id,
            EventKind::Deleted,
            self.clock.utc(),
            &json!({ "id": id, "user_id": user_id }),
        )
        .await?;
        Ok(())
    }

    async fn like(&self, user_id: &UserId, image_id: Uuid) -> Result<Like, Error> {
        self.get(image_id).await?;
        let like = Like {
            image_id,
            user_id: *user_id,
            created_at: self.clock.utc(),
        };
        self.images.add_like(&like).await.map_err(|err| match err {
            RepositoryError::Conflict { .. } => Error::conflict("image already liked"),
            other => repository_fault("insert like", other).into(),
        })?;

        publish(
            self.publisher.as_ref(),
            Topic::Likes,
            image_id,
            EventKind::Created,
            like.created_at,
            &like,
        )
        .await?;
        Ok(like)
    }

    async fn unlike(&self, user_id: &UserId, image_id: Uuid) -> Result<(), Error> {
        let removed = self
            .images
            .remove_like(image_id, user_id)
            .await
            .map_err(|err| repository_fault("delete like", err))?;
        if !removed {
            return Err(Error::not_found("like not found"));
        }

        publish(
            self.publisher.as_ref(),
            Topic::Likes,
            image_id,
            EventKind::Deleted,
            self.clock.utc(),
            &json!({ "image_id": image_id, "user_id": user_id }),
        )
        .await?;
        Ok(())
    }

    async fn comment(
        &self,
        user_id: &UserId,
        image_id: Uuid,
        draft: CommentDraft,
    ) -> Result<Comment, Error> {
        draft.validate()?;
        self.get(image_id).await?;
        let comment = Comment::create(image_id, *user_id, draft, self.clock.utc());
        self.images
            .add_comment(&comment)
            .await
            .map_err(|err| repository_fault("insert comment", err))?;

        publish(
            self.publisher.as_ref(),
            Topic::Comments,
            image_id,
            EventKind::Created,
            comment.created_at,
            &comment,
        )
        .await?;
        Ok(comment)
    }

    async fn comments(&self, image_id: Uuid, page: PageRequest) -> Result<Page<Comment>, Error> {
        self.get(image_id).await?;
        Ok(self
            .images
            .list_comments(image_id, page)
            .await
            .map_err(|err| repository_fault("list comments", err))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        MockEventPublisher, MockImageRepository, MockImageStore, StorageError,
    };
    use crate::domain::test_fixtures::{
        expect_event, fixture_clock, fixture_timestamp, no_events, owner,
    };
    use rstest::rstest;

    fn upload() -> ImageUpload {
        ImageUpload {
            title: Some("sunset".to_owned()),
            content_type: "image/png".to_owned(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn stored_image(user_id: UserId) -> Image {
        Image::create(user_id, &upload(), fixture_timestamp())
    }

    fn service(
        images: MockImageRepository,
        store: MockImageStore,
        publisher: MockEventPublisher,
    ) -> ImageService {
        ImageService::new(
            Arc::new(images),
            Arc::new(store),
            Arc::new(publisher),
            fixture_clock(),
        )
    }

    fn images_with(found: Option<Image>) -> MockImageRepository {
        let mut images = MockImageRepository::new();
        images.expect_find().returning(move |_| Ok(found.clone()));
        images
    }

    #[rstest]
    #[tokio::test]
    async fn upload_stores_bytes_under_generated_key() {
        let mut store = MockImageStore::new();
        store
            .expect_put()
            .withf(|key, bytes| key.ends_with(".png") && bytes.len() == 4)
            .times(1)
            .returning(|_, _| Ok(()));
        let mut images = MockImageRepository::new();
        images.expect_create().times(1).returning(|_| Ok(()));

        let image = service(images, store, expect_event(Topic::Images, EventKind::Created))
            .upload(&owner(), upload())
            .await
            .expect("uploaded");
        assert_eq!(image.size_bytes, 4);
        assert_eq!(image.like_count, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn upload_rejects_unsupported_type() {
        let mut store = MockImageStore::new();
        store.expect_put().never();
        let mut input = upload();
        input.content_type = "text/plain".to_owned();

        let error = service(MockImageRepository::new(), store, no_events())
            .upload(&owner(), input)
            .await
            .expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn upload_removes_content_when_metadata_insert_fails() {
        let mut store = MockImageStore::new();
        store.expect_put().returning(|_, _| Ok(()));
        store.expect_delete().times(1).returning(|_| Ok(()));
        let mut images = MockImageRepository::new();
        images
            .expect_create()
            .returning(|_| Err(RepositoryError::query("constraint")));

        let error = service(images, store, no_events())
            .upload(&owner(), upload())
            .await
            .expect_err("insert failed");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn content_missing_from_store_is_not_found() {
        let mut store = MockImageStore::new();
        store
            .expect_get()
            .returning(|key| Err(StorageError::not_found(key)));

        let error = service(images_with(Some(stored_image(owner()))), store, no_events())
            .content(Uuid::new_v4())
            .await
            .expect_err("missing content");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_by_other_user_is_forbidden() {
        let mut images = images_with(Some(stored_image(UserId::random())));
        images.expect_delete().never();

        let error = service(images, MockImageStore::new(), no_events())
            .delete(&owner(), Uuid::new_v4())
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_tolerates_storage_cleanup_failure() {
        let mut images = images_with(Some(stored_image(owner())));
        images.expect_delete().returning(|_, _| Ok(true));
        let mut store = MockImageStore::new();
        store
            .expect_delete()
            .returning(|_| Err(StorageError::io("disk full")));

        service(images, store, expect_event(Topic::Images, EventKind::Deleted))
            .delete(&owner(), Uuid::new_v4())
            .await
            .expect("deleted");
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_like_is_conflict() {
        let mut images = images_with(Some(stored_image(owner())));
        images
            .expect_add_like()
            .returning(|_| Err(RepositoryError::conflict("likes_pkey")));

        let error = service(images, MockImageStore::new(), no_events())
            .like(&owner(), Uuid::new_v4())
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn like_event_is_keyed_by_image() {
        let image_id = Uuid::new_v4();
        let mut images = images_with(Some(stored_image(owner())));
        images.expect_add_like().returning(|_| Ok(()));
        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .withf(move |envelope| {
                envelope.topic == Topic::Likes && envelope.key == image_id.to_string()
            })
            .times(1)
            .returning(|_| Ok(()));

        service(images, MockImageStore::new(), publisher)
            .like(&owner(), image_id)
            .await
            .expect("liked");
    }

    #[rstest]
    #[tokio::test]
    async fn unlike_without_like_is_not_found() {
        let mut images = MockImageRepository::new();
        images.expect_remove_like().returning(|_, _| Ok(false));

        let error = service(images, MockImageStore::new(), no_events())
            .unlike(&owner(), Uuid::new_v4())
            .await
            .expect_err("missing like");
        assert_eq!(error.message(), "like not found");
    }

    #[rstest]
    #[tokio::test]
    async fn comment_on_missing_image_is_not_found() {
        let mut images = images_with(None);
        images.expect_add_comment().never();

        let error = service(images, MockImageStore::new(), no_events())
            .comment(
                &owner(),
                Uuid::new_v4(),
                CommentDraft {
                    text: "lovely".to_owned(),
                },
            )
            .await
            .expect_err("missing image");
        assert_eq!(error.message(), "image not found");
    }

    #[rstest]
    #[tokio::test]
    async fn comment_is_published_on_comments_topic() {
        let mut images = images_with(Some(stored_image(owner())));
        images.expect_add_comment().times(1).returning(|_| Ok(()));

        let comment = service(
            images,
            MockImageStore::new(),
            expect_event(Topic::Comments, EventKind::Created),
        )
        .comment(
            &owner(),
            Uuid::new_v4(),
            CommentDraft {
                text: "lovely".to_owned(),
            },
        )
        .await
        .expect("commented");
        assert_eq!(comment.text, "lovely");
    }
}
