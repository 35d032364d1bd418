//! Shared helpers for the in-process HTTP tests.

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test as actix_test;
use serde_json::{Value, json};

/// `Authorization` header for `token`.
pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Read a JSON body.
pub async fn json_body(response: ServiceResponse) -> Value {
    actix_test::read_body_json(response).await
}

/// Register `username` and return a fresh bearer token for it.
pub async fn register_and_login<S>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let register = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "username": username,
            "password": "correct horse",
            "name": "Test User",
        }))
        .to_request();
    let response = actix_test::call_service(app, register).await;
    assert_eq!(response.status(), StatusCode::CREATED, "register {username}");

    let login = actix_test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "username": username, "password": "correct horse" }))
        .to_request();
    let response = actix_test::call_service(app, login).await;
    assert_eq!(response.status(), StatusCode::OK, "login {username}");
    let body = json_body(response).await;
    body["data"]["token"]
        .as_str()
        .expect("token in login response")
        .to_owned()
}
