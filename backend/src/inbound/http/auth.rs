//! Bearer-token authentication extractor.
//!
//! Protected handlers take an [`AuthenticatedUser`] argument. Extraction
//! reads `Authorization: Bearer <token>` and resolves it through
//! [`UserUsecase::authenticate`](crate::domain::ports::UserUsecase::authenticate);
//! a missing, malformed or unknown token yields 401.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, User, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// The user owning the presented bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    /// Identifier of the authenticated user.
    pub fn id(&self) -> &UserId {
        &self.0.id
    }
}

/// Pull the bearer token out of the request headers.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<String, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;
    Ok(token.to_owned())
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req.headers());
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state =
                state.ok_or_else(|| Error::internal("http state missing from app data"))?;
            state.users.authenticate(&token).await.map(Self)
        })
    }
}
