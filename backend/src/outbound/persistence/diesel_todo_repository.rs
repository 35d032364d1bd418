//! PostgreSQL-backed [`TodoRepository`].

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, TodoRepository};
use crate::domain::{Todo, TodoSearch, UserId};

use super::diesel_helpers::{
    contains_pattern, map_diesel_error, map_pool_error, page_window, total_items,
};
use super::models::TodoRow;
use super::pool::DbPool;
use super::schema::todos;

/// Diesel-backed todo storage.
#[derive(Clone)]
pub struct DieselTodoRepository {
    pool: DbPool,
}

impl DieselTodoRepository {
    /// Create a repository on `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn owned_matching(user_id: Uuid, filter: &TodoSearch) -> todos::BoxedQuery<'static, Pg> {
    let mut query = todos::table.filter(todos::user_id.eq(user_id)).into_boxed();
    if let Some(title) = filter.title.as_deref() {
        query = query.filter(todos::title.ilike(contains_pattern(title)));
    }
    if let Some(completed) = filter.is_completed {
        query = query.filter(todos::is_completed.eq(completed));
    }
    query
}

#[async_trait]
impl TodoRepository for DieselTodoRepository {
    async fn create(&self, todo: &Todo) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(todos::table)
            .values(TodoRow::from(todo))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, user_id: &UserId, id: Uuid) -> Result<Option<Todo>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TodoRow> = todos::table
            .filter(todos::id.eq(id))
            .filter(todos::user_id.eq(*user_id.as_uuid()))
            .select(TodoRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Todo::from))
    }

    async fn search(
        &self,
        user_id: &UserId,
        filter: &TodoSearch,
        page: PageRequest,
    ) -> Result<Page<Todo>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *user_id.as_uuid();

        let total: i64 = owned_matching(owner, filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = page_window(page);
        let rows: Vec<TodoRow> = owned_matching(owner, filter)
            .select(TodoRow::as_select())
            .order((todos::created_at.desc(), todos::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(
            rows.into_iter().map(Todo::from).collect(),
            page,
            total_items(total),
        ))
    }

    async fn update(&self, todo: &Todo) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::update(
            todos::table
                .filter(todos::id.eq(todo.id))
                .filter(todos::user_id.eq(*todo.user_id.as_uuid())),
        )
        .set(TodoRow::from(todo))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(rows > 0)
    }

    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::delete(
            todos::table
                .filter(todos::id.eq(id))
                .filter(todos::user_id.eq(*user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(rows > 0)
    }
}
