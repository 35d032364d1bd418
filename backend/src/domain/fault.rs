//! Context chains with optional response classification.
//!
//! Services wrap lower-level failures with a short context string as they
//! propagate upwards. Where the failure needs a specific response status, a
//! layer tags it with a [`Classification`]. Converting a [`Fault`] into a
//! domain [`Error`] walks the chain from the outermost wrapper inwards and
//! takes the first classification it meets, so the last layer to classify
//! wins. Chains with no classification at all become an internal error and
//! are logged in full.
//!
//! ```
//! use contactbook::domain::{Error, ErrorCode, ResultExt};
//!
//! let io: Result<(), std::io::Error> = Err(std::io::Error::other("disk full"));
//! let result = io
//!     .context("write image bytes")
//!     .classify(ErrorCode::ServiceUnavailable, "image storage unavailable");
//! let error = Error::from(result.expect_err("failure"));
//! assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
//! ```

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use tracing::error;

use super::{Error, ErrorCode};

/// Owned, thread-safe error trait object.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Response classification attached to a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Error category used to pick the response status.
    pub code: ErrorCode,
    /// Client-facing message.
    pub message: String,
}

/// A failure wrapped with context and, optionally, a classification.
#[derive(Debug)]
pub struct Fault {
    context: Cow<'static, str>,
    classification: Option<Classification>,
    source: BoxError,
}

impl Fault {
    /// Wrap `source` with a context string.
    pub fn new(context: impl Into<Cow<'static, str>>, source: impl Into<BoxError>) -> Self {
        Self {
            context: context.into(),
            classification: None,
            source: source.into(),
        }
    }

    /// Tag this fault with a classification.
    #[must_use]
    pub fn classified(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
        self.classification = Some(Classification {
            code,
            message: message.into(),
        });
        self
    }

    /// Context string recorded at this layer.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Classification recorded at this layer, if any.
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// Render the full cause chain as `outer: inner: root`.
    pub fn chain(&self) -> String {
        let mut rendered = self.context.to_string();
        let mut current = Some(self.source.as_ref() as &(dyn StdError + 'static));
        while let Some(cause) = current {
            rendered.push_str(": ");
            match cause.downcast_ref::<Fault>() {
                Some(fault) => rendered.push_str(fault.context()),
                None => rendered.push_str(&cause.to_string()),
            }
            current = cause.source();
        }
        rendered
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.context)
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Context and classification combinators for fallible results.
pub trait ResultExt<T> {
    /// Wrap the error with a context string.
    fn context(self, context: &'static str) -> Result<T, Fault>;

    /// Wrap the error and tag it with a classification.
    fn classify(self, code: ErrorCode, message: impl Into<String>) -> Result<T, Fault>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn context(self, context: &'static str) -> Result<T, Fault> {
        self.map_err(|err| Fault::new(context, err))
    }

    fn classify(self, code: ErrorCode, message: impl Into<String>) -> Result<T, Fault> {
        self.map_err(|err| {
            let message = message.into();
            Fault::new(Cow::Owned(message.clone()), err).classified(code, message)
        })
    }
}

enum Found<'a> {
    Tagged(&'a Classification),
    Domain(&'a Error),
}

fn find_classification<'a>(err: &'a (dyn StdError + 'static)) -> Option<Found<'a>> {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(fault) = cause.downcast_ref::<Fault>() {
            if let Some(classification) = fault.classification() {
                return Some(Found::Tagged(classification));
            }
        } else if let Some(domain) = cause.downcast_ref::<Error>() {
            return Some(Found::Domain(domain));
        }
        current = cause.source();
    }
    None
}

/// Return the outermost classification in `err`'s cause chain.
///
/// A domain [`Error`] found in the chain counts as a classification.
pub fn classification_of(err: &(dyn StdError + 'static)) -> Option<Classification> {
    find_classification(err).map(|found| match found {
        Found::Tagged(classification) => classification.clone(),
        Found::Domain(domain) => Classification {
            code: domain.code(),
            message: domain.message().to_owned(),
        },
    })
}

impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        match find_classification(&fault) {
            Some(Found::Tagged(classification)) => {
                if classification.code == ErrorCode::InternalError {
                    error!(chain = %fault.chain(), "internal failure");
                }
                Error::new(classification.code, classification.message.clone())
            }
            Some(Found::Domain(domain)) => domain.clone(),
            None => {
                error!(chain = %fault.chain(), "unclassified failure");
                Error::internal("internal server error")
            }
        }
    }
}
