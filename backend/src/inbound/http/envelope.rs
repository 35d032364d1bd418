//! Response envelope shared by every JSON endpoint.
//!
//! ```text
//! {"data": ..., "paging": {...} | null, "error_message": "", "error_detail": []}
//! ```
//!
//! All four keys are always present. Successful responses carry `data` (and
//! `paging` for lists) with an empty `error_message`; failures carry
//! `error_message` and `error_detail` with `data` set to `null`.

use pagination::{Page, Paging};
use serde::Serialize;

use crate::domain::Error;

/// JSON response body.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub paging: Option<Paging>,
    pub error_message: String,
    pub error_detail: Vec<String>,
}

impl<T> Envelope<T> {
    /// Wrap a single value.
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            paging: None,
            error_message: String::new(),
            error_detail: Vec::new(),
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// Wrap one page of a list.
    pub fn page(page: Page<T>) -> Self {
        Self {
            data: Some(page.items),
            paging: Some(page.paging),
            error_message: String::new(),
            error_detail: Vec::new(),
        }
    }
}

impl Envelope<()> {
    /// Body for a failed request.
    pub fn failure(message: impl Into<String>, detail: Vec<String>) -> Self {
        Self {
            data: None,
            paging: None,
            error_message: message.into(),
            error_detail: detail,
        }
    }

    /// Body for a successful request with nothing to return.
    pub fn empty() -> Self {
        Self {
            data: None,
            paging: None,
            error_message: String::new(),
            error_detail: Vec::new(),
        }
    }
}

impl From<&Error> for Envelope<()> {
    fn from(error: &Error) -> Self {
        Self::failure(error.message(), error.details().to_vec())
    }
}
