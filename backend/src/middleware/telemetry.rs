//! Telemetry decorator for ports.
//!
//! [`Traced`] opens a span per call carrying the component and operation and
//! records `otel.status_code` plus the error text once the call completes.
//! Spans nest under the request span opened by [`crate::Trace`], so a
//! subscriber that exports spans sees the full call tree.

use std::fmt::Display;
use std::sync::Arc;

use tracing::field::Empty;
use tracing::{Span, info_span};

/// Port wrapper that opens a span per call.
pub struct Traced<T: ?Sized> {
    component: &'static str,
    next: Arc<T>,
}

impl<T: ?Sized> Traced<T> {
    /// Wrap `next`, tagging spans with `component`.
    pub fn new(component: &'static str, next: Arc<T>) -> Self {
        Self { component, next }
    }

    /// The wrapped implementation.
    pub fn next(&self) -> &T {
        &self.next
    }

    /// Open the span for `operation` with outcome fields left empty.
    pub fn span(&self, operation: &'static str) -> Span {
        info_span!(
            "port",
            component = self.component,
            operation,
            otel.status_code = Empty,
            error = Empty,
        )
    }
}

/// Record the outcome of a call on its span.
pub fn record_outcome<R, E: Display>(span: &Span, result: &Result<R, E>) {
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(error) => {
            span.record("otel.status_code", "ERROR");
            span.record("error", tracing::field::display(error));
        }
    }
}
