//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::RepositoryError;

/// Port for reading and writing user accounts and their session tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Duplicate usernames yield
    /// [`RepositoryError::Conflict`].
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up an account by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Look up the account holding the session token with this fingerprint.
    async fn find_by_token(&self, fingerprint: &str) -> Result<Option<User>, RepositoryError>;

    /// Persist name, password hash and `updated_at`. Returns `false` when the
    /// account no longer exists.
    async fn update(&self, user: &User) -> Result<bool, RepositoryError>;

    /// Replace (or clear with `None`) the stored token fingerprint.
    async fn set_token(
        &self,
        id: &UserId,
        fingerprint: Option<String>,
    ) -> Result<bool, RepositoryError>;
}
