//! Port for password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing a password.
    pub enum HashError {
        /// The hasher rejected its input or parameters.
        Hashing => "password hashing failed: {message}",
    }
}

/// Port for deriving and checking password hashes.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Derive a self-describing hash string for `password`.
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Check `password` against a previously derived hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
