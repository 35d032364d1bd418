//! Process-local broker on tokio broadcast channels.
//!
//! One channel per topic. Every subscription sees every message published
//! after it subscribed. Nothing is persisted: uncommitted envelopes are
//! replayed after a rewind but are lost when the process exits.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, timeout_at};
use tracing::warn;

use crate::domain::ports::{BrokerError, EventBroker, EventPublisher, EventSubscription};
use crate::domain::{EventEnvelope, Topic};

const DEFAULT_CAPACITY: usize = 1024;

/// In-memory publisher and broker.
pub struct InMemoryBroker {
    capacity: usize,
    channels: Mutex<HashMap<Topic, broadcast::Sender<EventEnvelope>>>,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InMemoryBroker {
    /// Create a broker with the default per-topic buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a broker buffering up to `capacity` envelopes per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, topic: Topic) -> broadcast::Sender<EventEnvelope> {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryBroker {
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), BrokerError> {
        // Sending with no live receivers fails; the event is simply unobserved.
        let _receivers = self.sender(envelope.topic).send(envelope.clone()).unwrap_or(0);
        Ok(())
    }
}

#[async_trait]
impl EventBroker for InMemoryBroker {
    async fn subscribe(
        &self,
        topic: Topic,
        _group: &str,
    ) -> Result<Box<dyn EventSubscription>, BrokerError> {
        Ok(Box::new(InMemorySubscription {
            topic,
            receiver: self.sender(topic).subscribe(),
            in_flight: Vec::new(),
            replay: VecDeque::new(),
        }))
    }
}

struct InMemorySubscription {
    topic: Topic,
    receiver: broadcast::Receiver<EventEnvelope>,
    /// Fetched since the last commit or rewind.
    in_flight: Vec<EventEnvelope>,
    replay: VecDeque<EventEnvelope>,
}

impl InMemorySubscription {
    async fn recv(&mut self) -> Result<EventEnvelope, BrokerError> {
        let envelope = match self.replay.pop_front() {
            Some(envelope) => envelope,
            None => self.recv_live().await?,
        };
        self.in_flight.push(envelope.clone());
        Ok(envelope)
    }

    async fn recv_live(&mut self) -> Result<EventEnvelope, BrokerError> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Ok(envelope),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(topic = %self.topic, skipped, "subscription lagged; envelopes dropped");
                }
                Err(RecvError::Closed) => {
                    return Err(BrokerError::unavailable(format!(
                        "topic {} closed",
                        self.topic
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl EventSubscription for InMemorySubscription {
    async fn next_batch(
        &mut self,
        max: usize,
        linger: Duration,
    ) -> Result<Vec<EventEnvelope>, BrokerError> {
        let mut batch = vec![self.recv().await?];
        let deadline = Instant::now() + linger;
        while batch.len() < max {
            match timeout_at(deadline, self.recv()).await {
                Ok(Ok(envelope)) => batch.push(envelope),
                // Envelopes already taken stay in this batch.
                Ok(Err(_)) | Err(_) => break,
            }
        }
        Ok(batch)
    }

    async fn commit(&mut self) -> Result<(), BrokerError> {
        self.in_flight.clear();
        Ok(())
    }

    async fn rewind(&mut self) -> Result<(), BrokerError> {
        for envelope in self.in_flight.drain(..).rev() {
            self.replay.push_front(envelope);
        }
        Ok(())
    }
}
