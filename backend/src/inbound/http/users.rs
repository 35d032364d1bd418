//! Account handlers.
//!
//! ```text
//! POST   /api/v1/users           {"username":"ada","password":"correct horse","name":"Ada"}
//! POST   /api/v1/users/login     {"username":"ada","password":"correct horse"}
//! DELETE /api/v1/users/logout
//! GET    /api/v1/users/current
//! PATCH  /api/v1/users/current   {"name":"Ada Lovelace"}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::{LoginCredentials, ProfileUpdate, Registration, SessionToken, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{EmptyEnvelope, ErrorEnvelope, TokenEnvelope, UserEnvelope};
use crate::inbound::http::state::HttpState;

/// Registration body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "correct horse")]
    pub password: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
}

impl From<RegisterRequest> for Registration {
    fn from(value: RegisterRequest) -> Self {
        Self {
            username: value.username,
            password: Zeroizing::new(value.password),
            name: value.name,
        }
    }
}

/// Login body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Profile update body; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(value: UpdateProfileRequest) -> Self {
        Self {
            name: value.name,
            password: value.password.map(Zeroizing::new),
        }
    }
}

/// Public view of an account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Bearer token issued at login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

impl From<SessionToken> for TokenResponse {
    fn from(token: SessionToken) -> Self {
        Self {
            token: token.as_str().to_owned(),
        }
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 409, description = "Username taken", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.users.register(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(Envelope::data(UserResponse::from(user))))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = TokenEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<Envelope<TokenResponse>>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&username, &Zeroizing::new(password))?;
    let token = state.users.login(credentials).await?;
    Ok(web::Json(Envelope::data(token.into())))
}

/// Revoke the presented token.
#[utoipa::path(
    delete,
    path = "/api/v1/users/logout",
    responses(
        (status = 200, description = "Logged out", body = EmptyEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[delete("/users/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Envelope<()>>> {
    state.users.logout(user.id()).await?;
    Ok(web::Json(Envelope::empty()))
}

/// Fetch the authenticated account.
#[utoipa::path(
    get,
    path = "/api/v1/users/current",
    responses(
        (status = 200, description = "Current user", body = UserEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/current")]
pub async fn current(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Envelope<UserResponse>>> {
    let current = state.users.current(user.id()).await?;
    Ok(web::Json(Envelope::data(current.into())))
}

/// Change the authenticated account's name or password.
#[utoipa::path(
    patch,
    path = "/api/v1/users/current",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/current")]
pub async fn update_current(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<Envelope<UserResponse>>> {
    let updated = state
        .users
        .update_current(user.id(), payload.into_inner().into())
        .await?;
    Ok(web::Json(Envelope::data(updated.into())))
}
