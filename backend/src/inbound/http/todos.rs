//! Todo handlers.
//!
//! ```text
//! POST   /api/v1/todos                {"title":"Buy milk"}
//! GET    /api/v1/todos?title=milk&is_completed=false
//! GET    /api/v1/todos/{id}
//! PUT    /api/v1/todos/{id}
//! DELETE /api/v1/todos/{id}
//! PATCH  /api/v1/todos/{id}/complete
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{Todo, TodoDraft, TodoSearch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{EmptyEnvelope, ErrorEnvelope, TodoEnvelope, TodoPageEnvelope};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// Todo create/replace body. Completion is changed only through `complete`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TodoRequest {
    #[schema(example = "Buy milk")]
    pub title: String,
    pub description: Option<String>,
}

impl From<TodoRequest> for TodoDraft {
    fn from(value: TodoRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
        }
    }
}

/// Todo as returned to its owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            is_completed: todo.is_completed,
            completed_at: todo.completed_at,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// Search filters plus page window.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TodoSearchQuery {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    pub is_completed: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Create a todo.
#[utoipa::path(
    post,
    path = "/api/v1/todos",
    request_body = TodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["todos"],
    operation_id = "createTodo"
)]
#[post("/todos")]
pub async fn create_todo(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<TodoRequest>,
) -> ApiResult<HttpResponse> {
    let todo = state
        .todos
        .create(user.id(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(Envelope::data(TodoResponse::from(todo))))
}

/// Search the caller's todos.
#[utoipa::path(
    get,
    path = "/api/v1/todos",
    params(TodoSearchQuery),
    responses(
        (status = 200, description = "Matching todos", body = TodoPageEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["todos"],
    operation_id = "searchTodos"
)]
#[get("/todos")]
pub async fn search_todos(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<TodoSearchQuery>,
) -> ApiResult<web::Json<Envelope<Vec<TodoResponse>>>> {
    let TodoSearchQuery {
        title,
        is_completed,
        page,
        size,
    } = query.into_inner();
    let page = PageRequest::try_from(PageQuery { page, size })?;
    let filter = TodoSearch {
        title,
        is_completed,
    };
    let found = state.todos.search(user.id(), filter, page).await?;
    Ok(web::Json(Envelope::page(found.map(TodoResponse::from))))
}

/// Fetch one todo.
#[utoipa::path(
    get,
    path = "/api/v1/todos/{id}",
    params(("id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Todo", body = TodoEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["todos"],
    operation_id = "getTodo"
)]
#[get("/todos/{id}")]
pub async fn get_todo(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Envelope<TodoResponse>>> {
    let todo = state.todos.get(user.id(), path.into_inner()).await?;
    Ok(web::Json(Envelope::data(todo.into())))
}

/// Replace a todo's title and description.
#[utoipa::path(
    put,
    path = "/api/v1/todos/{id}",
    params(("id" = Uuid, Path, description = "Todo id")),
    request_body = TodoRequest,
    responses(
        (status = 200, description = "Updated todo", body = TodoEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["todos"],
    operation_id = "updateTodo"
)]
#[put("/todos/{id}")]
pub async fn update_todo(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<TodoRequest>,
) -> ApiResult<web::Json<Envelope<TodoResponse>>> {
    let todo = state
        .todos
        .update(user.id(), path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(Envelope::data(todo.into())))
}

/// Delete a todo.
#[utoipa::path(
    delete,
    path = "/api/v1/todos/{id}",
    params(("id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Deleted", body = EmptyEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["todos"],
    operation_id = "deleteTodo"
)]
#[delete("/todos/{id}")]
pub async fn delete_todo(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Envelope<()>>> {
    state.todos.delete(user.id(), path.into_inner()).await?;
    Ok(web::Json(Envelope::empty()))
}

/// Mark a todo as completed. Completing twice keeps the first timestamp.
#[utoipa::path(
    patch,
    path = "/api/v1/todos/{id}/complete",
    params(("id" = Uuid, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Completed todo", body = TodoEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["todos"],
    operation_id = "completeTodo"
)]
#[patch("/todos/{id}/complete")]
pub async fn complete_todo(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Envelope<TodoResponse>>> {
    let todo = state.todos.complete(user.id(), path.into_inner()).await?;
    Ok(web::Json(Envelope::data(todo.into())))
}
