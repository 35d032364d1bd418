//! PostgreSQL-backed [`ImageRepository`] covering images, likes and comments.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{ImageRepository, RepositoryError};
use crate::domain::{Comment, Image, Like, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error, page_window, total_items};
use super::models::{CommentRow, ImageRow, NewLikeRow};
use super::pool::DbPool;
use super::schema::{comments, images, likes};

/// Recount likes and comments for one image in a single statement.
const REFRESH_COUNTERS_SQL: &str = "\
UPDATE images SET \
    like_count = (SELECT COUNT(*) FROM likes WHERE image_id = $1), \
    comment_count = (SELECT COUNT(*) FROM comments WHERE image_id = $1) \
WHERE id = $1";

/// Diesel-backed image metadata storage.
#[derive(Clone)]
pub struct DieselImageRepository {
    pool: DbPool,
}

impl DieselImageRepository {
    /// Create a repository on `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageRepository for DieselImageRepository {
    async fn create(&self, image: &Image) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(images::table)
            .values(ImageRow::from(image))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Image>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ImageRow> = images::table
            .find(id)
            .select(ImageRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Image::from))
    }

    async fn list_by_owner(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Image>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *user_id.as_uuid();
        let total: i64 = images::table
            .filter(images::user_id.eq(owner))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<ImageRow> = images::table
            .filter(images::user_id.eq(owner))
            .select(ImageRow::as_select())
            .order((images::created_at.desc(), images::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(
            rows.into_iter().map(Image::from).collect(),
            page,
            total_items(total),
        ))
    }

    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::delete(
            images::table
                .filter(images::id.eq(id))
                .filter(images::user_id.eq(*user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(rows > 0)
    }

    async fn add_like(&self, like: &Like) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(likes::table)
            .values(NewLikeRow::from(like))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn remove_like(&self, image_id: Uuid, user_id: &UserId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::delete(likes::table.find((image_id, *user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows > 0)
    }

    async fn add_comment(&self, comment: &Comment) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(comments::table)
            .values(CommentRow::from(comment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_comments(
        &self,
        image_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = comments::table
            .filter(comments::image_id.eq(image_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<CommentRow> = comments::table
            .filter(comments::image_id.eq(image_id))
            .select(CommentRow::as_select())
            .order((comments::created_at.desc(), comments::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(
            rows.into_iter().map(Comment::from).collect(),
            page,
            total_items(total),
        ))
    }

    async fn refresh_counters(&self, image_id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::sql_query(REFRESH_COUNTERS_SQL)
            .bind::<sql_types::Uuid, _>(image_id)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
