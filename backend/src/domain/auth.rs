//! Authentication primitives: credentials, registration and bearer tokens.
//!
//! Passwords are held in [`Zeroizing`] buffers so they are wiped once the
//! request finishes. Session tokens are random 32-byte values rendered as hex;
//! only their SHA-256 fingerprint is persisted.

use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::user::{validate_name, validate_username};
use super::{Error, Validator};

/// Minimum password length in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length in characters.
pub const PASSWORD_MAX: usize = 100;

const TOKEN_BYTES: usize = 32;

fn validate_password(validator: &mut Validator, password: &str) {
    validator.length("password", password, PASSWORD_MIN, PASSWORD_MAX);
}

/// Username and password presented at login.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Build credentials, rejecting blank fields.
    ///
    /// # Examples
    /// ```
    /// use contactbook::domain::LoginCredentials;
    ///
    /// let creds = LoginCredentials::try_from_parts("ada", "correct horse").expect("valid");
    /// assert_eq!(creds.username(), "ada");
    /// assert!(LoginCredentials::try_from_parts(" ", "pw").is_err());
    /// ```
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, Error> {
        let mut validator = Validator::new();
        validator
            .ensure(!username.trim().is_empty(), "username", "must not be empty")
            .ensure(!password.is_empty(), "password", "must not be empty");
        validator.finish()?;
        Ok(Self {
            username: username.trim().to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username to look up.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Plain-text password to verify.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// New account request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: Zeroizing<String>,
    pub name: String,
}

impl Registration {
    /// Check field lengths.
    pub fn validate(&self) -> Result<(), Error> {
        let mut validator = Validator::new();
        validate_username(&mut validator, &self.username);
        validate_password(&mut validator, &self.password);
        validate_name(&mut validator, &self.name);
        validator.finish()
    }
}

/// Partial update of the current user's profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<Zeroizing<String>>,
}

impl ProfileUpdate {
    /// Check the fields that are present.
    pub fn validate(&self) -> Result<(), Error> {
        let mut validator = Validator::new();
        if let Some(name) = &self.name {
            validate_name(&mut validator, name);
        }
        if let Some(password) = &self.password {
            validate_password(&mut validator, password);
        }
        validator.finish()
    }
}

/// Opaque bearer token issued at login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Zeroizing<String>);

impl SessionToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; TOKEN_BYTES]);
        rand::thread_rng().fill_bytes(&mut bytes[..]);
        Self(Zeroizing::new(hex::encode(&bytes[..])))
    }

    /// Token text handed to the client.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Fingerprint stored in place of the token.
    pub fn fingerprint(&self) -> String {
        token_fingerprint(self.as_str())
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// SHA-256 hex digest of a bearer token.
pub fn token_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn registration(username: &str, password: &str, name: &str) -> Registration {
        Registration {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
            name: name.to_owned(),
        }
    }

    #[rstest]
    fn valid_registration_passes() {
        assert!(registration("ada", "correct horse", "Ada").validate().is_ok());
    }

    #[rstest]
    #[case(registration("", "correct horse", "Ada"), "username: must not be empty")]
    #[case(registration("ada", "short", "Ada"), "password: must be at least 8 characters")]
    #[case(registration("ada", "correct horse", ""), "name: must not be empty")]
    fn invalid_registration_reports_field(
        #[case] input: Registration,
        #[case] expected: &str,
    ) {
        let error = input.validate().expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details(), [expected]);
    }

    #[rstest]
    fn profile_update_checks_only_present_fields() {
        assert!(ProfileUpdate::default().validate().is_ok());
        let update = ProfileUpdate {
            name: Some("x".repeat(101)),
            password: None,
        };
        let error = update.validate().expect_err("too long");
        assert_eq!(error.details(), ["name: must be at most 100 characters"]);
    }

    #[rstest]
    fn tokens_are_random_hex() {
        let first = SessionToken::generate();
        let second = SessionToken::generate();
        assert_eq!(first.as_str().len(), TOKEN_BYTES * 2);
        assert!(first.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[rstest]
    fn fingerprint_is_stable_sha256() {
        let token = SessionToken::generate();
        assert_eq!(token.fingerprint(), token_fingerprint(token.as_str()));
        assert_eq!(token.fingerprint().len(), 64);
        assert_ne!(token.fingerprint(), token.as_str());
    }
}
