//! Port for todo persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Todo, TodoSearch, UserId};

use super::RepositoryError;

/// Port for storing and querying todos, scoped by owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Insert a new todo.
    async fn create(&self, todo: &Todo) -> Result<(), RepositoryError>;

    /// Load a todo owned by `user_id`.
    async fn find(&self, user_id: &UserId, id: Uuid) -> Result<Option<Todo>, RepositoryError>;

    /// Filter the owner's todos and return one page plus the total count.
    async fn search(
        &self,
        user_id: &UserId,
        filter: &TodoSearch,
        page: PageRequest,
    ) -> Result<Page<Todo>, RepositoryError>;

    /// Overwrite a todo, matching on both id and owner.
    async fn update(&self, todo: &Todo) -> Result<bool, RepositoryError>;

    /// Delete a todo, matching on both id and owner.
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError>;
}
