//! Todo items owned by a user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::contact::contains_ci;
use super::{Error, UserId, Validator};

/// Todo item.
///
/// ## Invariants
/// - `completed_at` is `Some` exactly when `is_completed` holds.
/// - Once set, `completed_at` never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable todo fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
}

impl TodoDraft {
    /// Check field lengths.
    pub fn validate(&self) -> Result<(), Error> {
        let mut validator = Validator::new();
        validator
            .required("title", &self.title, 100)
            .optional("description", self.description.as_deref(), 1000);
        validator.finish()
    }
}

impl Todo {
    /// Materialise a new, incomplete todo.
    pub fn create(user_id: UserId, draft: TodoDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: draft.title,
            description: draft.description,
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace title and description. Completion state is untouched.
    pub fn apply(&mut self, draft: TodoDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.description = draft.description;
        self.updated_at = now;
    }

    /// Mark the todo complete at `at`.
    ///
    /// Returns `false` and leaves the record untouched when it was already
    /// complete.
    pub fn complete(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_completed {
            return false;
        }
        self.is_completed = true;
        self.completed_at = Some(at);
        self.updated_at = at;
        true
    }
}

/// Optional filters for todo search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoSearch {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Exact completion state.
    pub is_completed: Option<bool>,
}

impl TodoSearch {
    /// In-process form of the filter, shared by non-SQL adapters.
    pub fn matches(&self, todo: &Todo) -> bool {
        self.title
            .as_deref()
            .is_none_or(|needle| contains_ci(&todo.title, needle))
            && self
                .is_completed
                .is_none_or(|completed| todo.is_completed == completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn todo() -> Todo {
        Todo::create(
            UserId::random(),
            TodoDraft {
                title: "Write report".to_owned(),
                description: None,
            },
            Utc::now(),
        )
    }

    #[rstest]
    fn new_todo_is_incomplete(todo: Todo) {
        assert!(!todo.is_completed);
        assert!(todo.completed_at.is_none());
    }

    #[rstest]
    fn complete_sets_flag_and_timestamp_once(mut todo: Todo) {
        let first = todo.created_at + Duration::minutes(1);
        assert!(todo.complete(first));
        assert!(todo.is_completed);
        assert_eq!(todo.completed_at, Some(first));

        let second = first + Duration::minutes(1);
        assert!(!todo.complete(second));
        assert_eq!(todo.completed_at, Some(first));
        assert_eq!(todo.updated_at, first);
    }

    #[rstest]
    fn title_is_required() {
        let error = TodoDraft::default().validate().expect_err("blank title");
        assert_eq!(error.details(), ["title: must not be empty"]);
    }

    #[rstest]
    #[case(TodoSearch::default(), true)]
    #[case(TodoSearch { title: Some("REPORT".into()), is_completed: None }, true)]
    #[case(TodoSearch { title: None, is_completed: Some(true) }, false)]
    #[case(TodoSearch { title: Some("report".into()), is_completed: Some(false) }, true)]
    fn search_filters(todo: Todo, #[case] search: TodoSearch, #[case] expected: bool) {
        assert_eq!(search.matches(&todo), expected);
    }
}
