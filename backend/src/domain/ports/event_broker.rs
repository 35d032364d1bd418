//! Consumer-side broker port.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{EventEnvelope, Topic};

use super::BrokerError;

/// Factory for per-topic subscriptions in a consumer group.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBroker: Send + Sync {
    /// Join `group` on `topic`.
    async fn subscribe(
        &self,
        topic: Topic,
        group: &str,
    ) -> Result<Box<dyn EventSubscription>, BrokerError>;
}

/// A live subscription delivering envelopes in batches.
///
/// Offsets advance only on [`commit`](EventSubscription::commit). Envelopes
/// fetched since the last commit are handed back by
/// [`rewind`](EventSubscription::rewind) and come out of the next batch again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSubscription: Send {
    /// Wait for at least one envelope, then keep collecting until `max`
    /// envelopes are buffered or `linger` has elapsed.
    async fn next_batch(
        &mut self,
        max: usize,
        linger: Duration,
    ) -> Result<Vec<EventEnvelope>, BrokerError>;

    /// Acknowledge everything fetched since the last commit or rewind.
    async fn commit(&mut self) -> Result<(), BrokerError>;

    /// Return everything fetched since the last commit or rewind so the next
    /// batch starts with it.
    async fn rewind(&mut self) -> Result<(), BrokerError>;
}
