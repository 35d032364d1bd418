//! Account service implementing [`UserUsecase`].
//!
//! Bearer tokens are issued at login and revoked at logout; only their
//! SHA-256 fingerprint reaches the repository, so a leaked database does not
//! leak usable tokens.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use super::ports::{EventPublisher, PasswordHasher, RepositoryError, UserRepository, UserUsecase};
use super::service_support::{publish, repository_fault};
use super::{
    Error, EventKind, LoginCredentials, ProfileUpdate, Registration, ResultExt, SessionToken,
    Topic, User, UserId, token_fingerprint,
};

const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Account service.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Create the service from its collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            publisher,
            clock,
        }
    }

    async fn load(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(|err| repository_fault("find user by id", err))?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[async_trait]
impl UserUsecase for UserService {
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        registration.validate()?;
        let now = self.clock.utc();
        let password_hash = self
            .hasher
            .hash(&registration.password)
            .context("hash password")?;
        let user = User {
            id: UserId::random(),
            username: registration.username.trim().to_owned(),
            name: registration.name,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        self.users.create(&user).await.map_err(|err| match err {
            RepositoryError::Conflict { .. } => Error::conflict("username already taken"),
            other => repository_fault("insert user", other).into(),
        })?;

        publish(
            self.publisher.as_ref(),
            Topic::Users,
            user.id,
            EventKind::Created,
            now,
            &user,
        )
        .await?;
        Ok(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<SessionToken, Error> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(|err| repository_fault("find user by username", err))?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        if !self
            .hasher
            .verify(credentials.password(), &user.password_hash)
        {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let token = SessionToken::generate();
        let stored = self
            .users
            .set_token(&user.id, Some(token.fingerprint()))
            .await
            .map_err(|err| repository_fault("store session token", err))?;
        if !stored {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        publish(
            self.publisher.as_ref(),
            Topic::Users,
            user.id,
            EventKind::LoggedIn,
            self.clock.utc(),
            &json!({ "user_id": user.id }),
        )
        .await?;
        Ok(token)
    }

    async fn logout(&self, user_id: &UserId) -> Result<(), Error> {
        let cleared = self
            .users
            .set_token(user_id, None)
            .await
            .map_err(|err| repository_fault("clear session token", err))?;
        if !cleared {
            return Err(Error::not_found("user not found"));
        }

        publish(
            self.publisher.as_ref(),
            Topic::Users,
            user_id,
            EventKind::LoggedOut,
            self.clock.utc(),
            &json!({ "user_id": user_id }),
        )
        .await?;
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<User, Error> {
        if token.trim().is_empty() {
            return Err(Error::unauthorized("missing bearer token"));
        }
        self.users
            .find_by_token(&token_fingerprint(token))
            .await
            .map_err(|err| repository_fault("find user by token", err))?
            .ok_or_else(|| Error::unauthorized("invalid or expired token"))
    }

    async fn current(&self, user_id: &UserId) -> Result<User, Error> {
        self.load(user_id).await
    }

    async fn update_current(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User, Error> {
        update.validate()?;
        let mut user = self.load(user_id).await?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(password) = update.password {
            user.password_hash = self.hasher.hash(&password).context("hash password")?;
        }
        user.updated_at = self.clock.utc();

        let updated = self
            .users
            .update(&user)
            .await
            .map_err(|err| repository_fault("update user", err))?;
        if !updated {
            return Err(Error::not_found("user not found"));
        }

        publish(
            self.publisher.as_ref(),
            Topic::Users,
            user.id,
            EventKind::Updated,
            user.updated_at,
            &user,
        )
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository};
    use crate::domain::test_fixtures::{
        expect_event, fixture_clock, fixture_timestamp, no_events, owner,
    };
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn stored_user() -> User {
        User {
            id: owner(),
            username: "ada".to_owned(),
            name: "Ada".to_owned(),
            password_hash: "hashed:correct horse".to_owned(),
            created_at: fixture_timestamp(),
            updated_at: fixture_timestamp(),
        }
    }

    fn hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|password| Ok(format!("hashed:{password}")));
        hasher
            .expect_verify()
            .returning(|password, hash| hash == format!("hashed:{password}"));
        hasher
    }

    fn service(
        users: MockUserRepository,
        publisher: crate::domain::ports::MockEventPublisher,
    ) -> UserService {
        UserService::new(
            Arc::new(users),
            Arc::new(hasher()),
            Arc::new(publisher),
            fixture_clock(),
        )
    }

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.to_owned(),
            password: Zeroizing::new("correct horse".to_owned()),
            name: "Ada".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn register_hashes_password_and_stamps_timestamps() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|user| user.password_hash == "hashed:correct horse")
            .times(1)
            .returning(|_| Ok(()));

        let user = service(users, expect_event(Topic::Users, EventKind::Created))
            .register(registration("  ada "))
            .await
            .expect("registered");

        assert_eq!(user.username, "ada");
        assert_eq!(user.created_at, fixture_timestamp());
        assert_eq!(user.updated_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn register_maps_duplicate_username_to_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .returning(|_| Err(RepositoryError::conflict("users_username_key")));

        let error = service(users, no_events())
            .register(registration("ada"))
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn register_rejects_short_password_before_touching_storage() {
        let mut users = MockUserRepository::new();
        users.expect_create().never();
        let mut input = registration("ada");
        input.password = Zeroizing::new("short".to_owned());

        let error = service(users, no_events())
            .register(input)
            .await
            .expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn login_stores_token_fingerprint() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(stored_user())));
        users
            .expect_set_token()
            .withf(|_, fingerprint| fingerprint.as_ref().is_some_and(|f| f.len() == 64))
            .times(1)
            .returning(|_, _| Ok(true));

        let credentials =
            LoginCredentials::try_from_parts("ada", "correct horse").expect("credentials");
        let token = service(users, expect_event(Topic::Users, EventKind::LoggedIn))
            .login(credentials)
            .await
            .expect("login");
        assert_eq!(token.as_str().len(), 64);
    }

    #[rstest]
    #[case(Some(stored_user()), "wrong password")]
    #[case(None, "correct horse")]
    #[tokio::test]
    async fn login_rejects_bad_credentials(
        #[case] found: Option<User>,
        #[case] password: &str,
    ) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .return_once(move |_| Ok(found));
        users.expect_set_token().never();

        let credentials = LoginCredentials::try_from_parts("ada", password).expect("credentials");
        let error = service(users, no_events())
            .login(credentials)
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_looks_up_fingerprint() {
        let token = SessionToken::generate();
        let expected = token.fingerprint();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_token()
            .withf(move |fingerprint| fingerprint == expected)
            .returning(|_| Ok(Some(stored_user())));

        let user = service(users, no_events())
            .authenticate(token.as_str())
            .await
            .expect("authenticated");
        assert_eq!(user.id, owner());
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_maps_connection_failure_to_unavailable() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_token()
            .returning(|_| Err(RepositoryError::connection("pool exhausted")));

        let error = service(users, no_events())
            .authenticate("abc")
            .await
            .expect_err("unavailable");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn logout_clears_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_set_token()
            .withf(|_, fingerprint| fingerprint.is_none())
            .times(1)
            .returning(|_, _| Ok(true));

        service(users, expect_event(Topic::Users, EventKind::LoggedOut))
            .logout(&owner())
            .await
            .expect("logged out");
    }

    #[rstest]
    #[tokio::test]
    async fn update_current_rehashes_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(stored_user())));
        users
            .expect_update()
            .withf(|user| user.password_hash == "hashed:new password" && user.name == "Ada L.")
            .times(1)
            .returning(|_| Ok(true));

        let update = ProfileUpdate {
            name: Some("Ada L.".to_owned()),
            password: Some(Zeroizing::new("new password".to_owned())),
        };
        let user = service(users, expect_event(Topic::Users, EventKind::Updated))
            .update_current(&owner(), update)
            .await
            .expect("updated");
        assert_eq!(user.name, "Ada L.");
    }
}
