//! Driving port for todo operations.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Error, Todo, TodoDraft, TodoSearch, UserId};

/// Todo CRUD, search and completion, scoped to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoUsecase: Send + Sync {
    /// Validate and store a new todo.
    async fn create(&self, user_id: &UserId, draft: TodoDraft) -> Result<Todo, Error>;

    /// Load one of the caller's todos.
    async fn get(&self, user_id: &UserId, id: Uuid) -> Result<Todo, Error>;

    /// Filter and page through the caller's todos.
    async fn search(
        &self,
        user_id: &UserId,
        filter: TodoSearch,
        page: PageRequest,
    ) -> Result<Page<Todo>, Error>;

    /// Replace title and description.
    async fn update(&self, user_id: &UserId, id: Uuid, draft: TodoDraft) -> Result<Todo, Error>;

    /// Delete a todo.
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<(), Error>;

    /// Mark a todo complete. Completing twice keeps the first timestamp.
    async fn complete(&self, user_id: &UserId, id: Uuid) -> Result<Todo, Error>;
}
