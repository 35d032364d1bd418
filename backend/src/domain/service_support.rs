//! Helpers shared by the domain services.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ports::{EventPublisher, RepositoryError, StorageError};
use super::{ErrorCode, EventEnvelope, EventKind, Fault, Topic};

/// Wrap a repository failure with context.
///
/// Connection failures are classified as `service_unavailable`; everything
/// else stays unclassified and surfaces as an internal error.
pub(crate) fn repository_fault(context: &'static str, error: RepositoryError) -> Fault {
    match error {
        RepositoryError::Connection { .. } => {
            Fault::new(context, error).classified(ErrorCode::ServiceUnavailable, "database unavailable")
        }
        other => Fault::new(context, other),
    }
}

/// Wrap an image storage failure with context.
pub(crate) fn storage_fault(context: &'static str, error: StorageError) -> Fault {
    match error {
        StorageError::NotFound { .. } => {
            Fault::new(context, error).classified(ErrorCode::NotFound, "image content not found")
        }
        other => Fault::new(context, other),
    }
}

/// Build an envelope and publish it synchronously.
pub(crate) async fn publish<P: Serialize + Sync>(
    publisher: &dyn EventPublisher,
    topic: Topic,
    key: impl std::fmt::Display + Send,
    kind: EventKind,
    occurred_at: DateTime<Utc>,
    payload: &P,
) -> Result<(), Fault> {
    let envelope = EventEnvelope::new(topic, key, kind, occurred_at, payload)
        .map_err(|err| Fault::new("encode event", err))?;
    publisher
        .publish(&envelope)
        .await
        .map_err(|err| Fault::new("publish event", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use rstest::rstest;

    #[rstest]
    #[case(RepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(RepositoryError::conflict("duplicate"), ErrorCode::InternalError)]
    fn repository_failures_are_classified(
        #[case] failure: RepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let error = Error::from(repository_fault("load", failure));
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    fn missing_content_is_not_found() {
        let error = Error::from(storage_fault("read", StorageError::not_found("k.png")));
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
