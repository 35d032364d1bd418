//! Shared validation helpers for inbound HTTP adapters.
//!
//! Extractor failures (malformed JSON, bad query strings, unparsable path
//! segments, oversized raw bodies) are turned into 400 envelopes instead of
//! actix's plain-text defaults. Page parameters are validated here before
//! they reach a usecase.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use futures_util::StreamExt;
use pagination::{PageRequest, PageRequestError};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;

/// Largest JSON body accepted by any endpoint.
pub const JSON_LIMIT_BYTES: usize = 64 * 1024;

fn rejected(message: &str, cause: impl std::fmt::Display) -> actix_web::Error {
    Error::invalid_request(message)
        .with_details(vec![cause.to_string()])
        .into()
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    rejected("invalid request body", err)
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    rejected("invalid query string", err)
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    rejected("invalid path parameter", err)
}

/// JSON extractor configuration rendering failures as envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(json_error)
}

/// Query extractor configuration rendering failures as envelopes.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error)
}

/// Path extractor configuration rendering failures as envelopes.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error)
}

/// Read a raw request body, rejecting it once it grows past `limit` bytes.
pub async fn read_body(mut payload: web::Payload, limit: usize) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|err| {
            Error::invalid_request("invalid request body").with_details(vec![err.to_string()])
        })?;
        if body.len() + chunk.len() > limit {
            return Err(Error::invalid_request("validation failed")
                .with_details(vec![format!("content: must be at most {limit} bytes")]));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// `page` and `size` query parameters shared by list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Items per page; defaults to 10, at most 100.
    pub size: Option<u32>,
}

impl TryFrom<PageQuery> for PageRequest {
    type Error = Error;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        Self::from_query(query.page, query.size).map_err(page_error)
    }
}

fn page_error(err: PageRequestError) -> Error {
    let field = match err {
        PageRequestError::PageOutOfRange => "page",
        PageRequestError::SizeOutOfRange { .. } => "size",
    };
    Error::invalid_request("validation failed").with_details(vec![format!("{field}: {err}")])
}
