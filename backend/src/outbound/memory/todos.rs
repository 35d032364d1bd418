use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, TodoRepository};
use crate::domain::{Todo, TodoSearch, UserId};

use super::{lock, paginate};

/// In-memory todo storage.
#[derive(Default)]
pub struct InMemoryTodoRepository {
    rows: Mutex<HashMap<Uuid, Todo>>,
}

impl InMemoryTodoRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn create(&self, todo: &Todo) -> Result<(), RepositoryError> {
        let mut rows = lock(&self.rows);
        if rows.contains_key(&todo.id) {
            return Err(RepositoryError::conflict("todos_pkey"));
        }
        rows.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn find(&self, user_id: &UserId, id: Uuid) -> Result<Option<Todo>, RepositoryError> {
        Ok(lock(&self.rows)
            .get(&id)
            .filter(|t| t.user_id == *user_id)
            .cloned())
    }

    async fn search(
        &self,
        user_id: &UserId,
        filter: &TodoSearch,
        page: PageRequest,
    ) -> Result<Page<Todo>, RepositoryError> {
        let matching = lock(&self.rows)
            .values()
            .filter(|t| t.user_id == *user_id && filter.matches(t))
            .cloned()
            .collect();
        Ok(paginate(matching, page, |t: &Todo| (t.created_at, t.id)))
    }

    async fn update(&self, todo: &Todo) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        match rows.get_mut(&todo.id) {
            Some(stored) if stored.user_id == todo.user_id => {
                *stored = todo.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        if rows.get(&id).is_some_and(|t| t.user_id == *user_id) {
            rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TodoDraft;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[case(Some(true), 1)]
    #[case(Some(false), 2)]
    #[case(None, 3)]
    #[tokio::test]
    async fn search_filters_on_completion(#[case] is_completed: Option<bool>, #[case] expected: u64) {
        let repo = InMemoryTodoRepository::new();
        let owner = UserId::random();
        for (index, title) in ["a", "b", "c"].into_iter().enumerate() {
            let mut todo = Todo::create(
                owner,
                TodoDraft {
                    title: title.to_owned(),
                    description: None,
                },
                Utc::now(),
            );
            if index == 0 {
                todo.complete(Utc::now());
            }
            repo.create(&todo).await.expect("insert");
        }

        let filter = TodoSearch {
            title: None,
            is_completed,
        };
        let page = repo
            .search(&owner, &filter, PageRequest::default())
            .await
            .expect("search");
        assert_eq!(page.paging.total_item, expected);
    }
}
