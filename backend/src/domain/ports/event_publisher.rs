//! Producer-side broker port.

use async_trait::async_trait;

use crate::domain::EventEnvelope;

use super::define_port_error;

define_port_error! {
    /// Errors raised by broker adapters, on either side.
    pub enum BrokerError {
        /// The broker could not be reached or refused the operation.
        Unavailable => "broker unavailable: {message}",
        /// An envelope could not be encoded or decoded.
        Codec => "broker payload invalid: {message}",
    }
}

/// Port for publishing domain events. Publishing is synchronous: the call
/// returns once the broker has acknowledged the message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one envelope on its topic, keyed by `envelope.key`.
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), BrokerError>;
}
