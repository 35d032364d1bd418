//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::domain::ports::{
    MockAddressUsecase, MockContactUsecase, MockImageUsecase, MockTodoUsecase, MockUserUsecase,
};
use crate::domain::{User, UserId};
use crate::inbound::http::configure;
use crate::inbound::http::state::HttpState;

/// Bearer token accepted by [`TestPorts::authenticated`].
pub const TOKEN: &str = "test-token";

/// `Authorization` header carrying [`TOKEN`].
pub fn bearer() -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {TOKEN}"))
}

/// A fixed, already registered user.
pub fn sample_user() -> User {
    let at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).single().unwrap_or_default();
    User {
        id: UserId::random(),
        username: "ada".to_owned(),
        name: "Ada Lovelace".to_owned(),
        password_hash: "$argon2id$stub".to_owned(),
        created_at: at,
        updated_at: at,
    }
}

/// Mock usecases; set expectations, then call [`TestPorts::app`].
#[derive(Default)]
pub struct TestPorts {
    pub users: MockUserUsecase,
    pub contacts: MockContactUsecase,
    pub addresses: MockAddressUsecase,
    pub todos: MockTodoUsecase,
    pub images: MockImageUsecase,
}

impl TestPorts {
    /// Accept [`TOKEN`] as belonging to `user`.
    pub fn authenticated(mut self, user: &User) -> Self {
        let user = user.clone();
        self.users
            .expect_authenticate()
            .withf(|token| token == TOKEN)
            .returning(move |_| Ok(user.clone()));
        self
    }

    fn into_state(self) -> HttpState {
        HttpState {
            users: Arc::new(self.users),
            contacts: Arc::new(self.contacts),
            addresses: Arc::new(self.addresses),
            todos: Arc::new(self.todos),
            images: Arc::new(self.images),
        }
    }

    /// App serving the API routes over these mocks.
    pub fn app(
        self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.into_state()))
            .configure(configure)
    }
}

/// Read a response body as JSON.
pub async fn json_body(response: ServiceResponse) -> Value {
    let bytes = test::read_body(response).await;
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
