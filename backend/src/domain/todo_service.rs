//! Todo service implementing [`TodoUsecase`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use uuid::Uuid;

use super::ports::{EventPublisher, TodoRepository, TodoUsecase};
use super::service_support::{publish, repository_fault};
use super::{Error, EventKind, Todo, TodoDraft, TodoSearch, Topic, UserId};

/// Todo service.
#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodoRepository>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl TodoService {
    /// Create the service from its collaborators.
    pub fn new(
        todos: Arc<dyn TodoRepository>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            todos,
            publisher,
            clock,
        }
    }

    async fn store(&self, todo: &Todo, kind: EventKind) -> Result<(), Error> {
        let updated = self
            .todos
            .update(todo)
            .await
            .map_err(|err| repository_fault("update todo", err))?;
        if !updated {
            return Err(Error::not_found("todo not found"));
        }
        publish(
            self.publisher.as_ref(),
            Topic::Todos,
            todo.id,
            kind,
            todo.updated_at,
            todo,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TodoUsecase for TodoService {
    async fn create(&self, user_id: &UserId, draft: TodoDraft) -> Result<Todo, Error> {
        draft.validate()?;
        let todo = Todo::create(*user_id, draft, self.clock.utc());
        self.todos
            .create(&todo)
            .await
            .map_err(|err| repository_fault("insert todo", err))?;

        publish(
            self.publisher.as_ref(),
            Topic::Todos,
            todo.id,
            EventKind::Created,
            todo.created_at,
            &todo,
        )
        .await?;
        Ok(todo)
    }

    async fn get(&self, user_id: &UserId, id: Uuid) -> Result<Todo, Error> {
        self.todos
            .find(user_id, id)
            .await
            .map_err(|err| repository_fault("find todo", err))?
            .ok_or_else(|| Error::not_found("todo not found"))
    }

    async fn search(
        &self,
        user_id: &UserId,
        filter: TodoSearch,
        page: PageRequest,
    ) -> Result<Page<Todo>, Error> {
        Ok(self
            .todos
            .search(user_id, &filter, page)
            .await
            .map_err(|err| repository_fault("search todos", err))?)
    }

    async fn update(&self, user_id: &UserId, id: Uuid, draft: TodoDraft) -> Result<Todo, Error> {
        draft.validate()?;
        let mut todo = self.get(user_id, id).await?;
        todo.apply(draft, self.clock.utc());
        self.store(&todo, EventKind::Updated).await?;
        Ok(todo)
    }

    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .todos
            .delete(user_id, id)
            .await
            .map_err(|err| repository_fault("delete todo", err))?;
        if !deleted {
            return Err(Error::not_found("todo not found"));
        }

        publish(
            self.publisher.as_ref(),
            Topic::Todos,
            id,
            EventKind::Deleted,
            self.clock.utc(),
            &json!({ "id": id, "user_id": user_id }),
        )
        .await?;
        Ok(())
    }

    async fn complete(&self, user_id: &UserId, id: Uuid) -> Result<Todo, Error> {
        let mut todo = self.get(user_id, id).await?;
        if todo.complete(self.clock.utc()) {
            self.store(&todo, EventKind::Completed).await?;
        }
        Ok(todo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockEventPublisher, MockTodoRepository};
    use crate::domain::test_fixtures::{
        expect_event, fixture_clock, fixture_timestamp, no_events, owner,
    };
    use chrono::Duration;
    use rstest::rstest;

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_owned(),
            description: None,
        }
    }

    fn open_todo() -> Todo {
        Todo::create(
            owner(),
            draft("water plants"),
            fixture_timestamp() - Duration::days(1),
        )
    }

    fn service(todos: MockTodoRepository, publisher: MockEventPublisher) -> TodoService {
        TodoService::new(Arc::new(todos), Arc::new(publisher), fixture_clock())
    }

    #[rstest]
    #[tokio::test]
    async fn create_starts_incomplete() {
        let mut todos = MockTodoRepository::new();
        todos
            .expect_create()
            .withf(|todo| !todo.is_completed && todo.completed_at.is_none())
            .times(1)
            .returning(|_| Ok(()));

        let todo = service(todos, expect_event(Topic::Todos, EventKind::Created))
            .create(&owner(), draft("water plants"))
            .await
            .expect("created");
        assert_eq!(todo.created_at, fixture_timestamp());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn create_requires_title(#[case] title: &str) {
        let mut todos = MockTodoRepository::new();
        todos.expect_create().never();

        let error = service(todos, no_events())
            .create(&owner(), draft(title))
            .await
            .expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn complete_stamps_completion_time() {
        let todo = open_todo();
        let id = todo.id;
        let mut todos = MockTodoRepository::new();
        todos.expect_find().return_once(move |_, _| Ok(Some(todo)));
        todos
            .expect_update()
            .withf(|todo| todo.is_completed)
            .times(1)
            .returning(|_| Ok(true));

        let completed = service(todos, expect_event(Topic::Todos, EventKind::Completed))
            .complete(&owner(), id)
            .await
            .expect("completed");
        assert!(completed.is_completed);
        assert_eq!(completed.completed_at, Some(fixture_timestamp()));
    }

    #[rstest]
    #[tokio::test]
    async fn completing_twice_keeps_first_timestamp() {
        let mut todo = open_todo();
        let first = fixture_timestamp() - Duration::hours(2);
        todo.complete(first);
        let id = todo.id;
        let mut todos = MockTodoRepository::new();
        todos.expect_find().return_once(move |_, _| Ok(Some(todo)));
        todos.expect_update().never();

        let again = service(todos, no_events())
            .complete(&owner(), id)
            .await
            .expect("idempotent");
        assert_eq!(again.completed_at, Some(first));
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_completion_state() {
        let mut todo = open_todo();
        todo.complete(fixture_timestamp());
        let id = todo.id;
        let mut todos = MockTodoRepository::new();
        todos.expect_find().return_once(move |_, _| Ok(Some(todo)));
        todos.expect_update().returning(|_| Ok(true));

        let updated = service(todos, expect_event(Topic::Todos, EventKind::Updated))
            .update(&owner(), id, draft("repot plants"))
            .await
            .expect("updated");
        assert!(updated.is_completed);
        assert_eq!(updated.title, "repot plants");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_unknown_todo_is_not_found() {
        let mut todos = MockTodoRepository::new();
        todos.expect_delete().returning(|_, _| Ok(false));

        let error = service(todos, no_events())
            .delete(&owner(), Uuid::new_v4())
            .await
            .expect_err("missing");
        assert_eq!(error.message(), "todo not found");
    }
}
