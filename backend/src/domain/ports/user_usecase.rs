//! Driving port for account operations.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, ProfileUpdate, Registration, SessionToken, User, UserId};

/// Account registration, login and profile use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserUsecase: Send + Sync {
    /// Create an account. Duplicate usernames are a conflict.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Verify credentials and issue a fresh bearer token, replacing any
    /// previous one.
    async fn login(&self, credentials: LoginCredentials) -> Result<SessionToken, Error>;

    /// Revoke the caller's bearer token.
    async fn logout(&self, user_id: &UserId) -> Result<(), Error>;

    /// Resolve a bearer token to its account.
    async fn authenticate(&self, token: &str) -> Result<User, Error>;

    /// Load the caller's account.
    async fn current(&self, user_id: &UserId) -> Result<User, Error>;

    /// Change the caller's name and/or password.
    async fn update_current(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User, Error>;
}
