//! Kafka adapter on `rdkafka`.
//!
//! Envelopes travel as JSON keyed by entity id. Consumers join a group with
//! auto-commit disabled. Each subscription tracks the offsets it has read per
//! partition and commits exactly those, or seeks back to the first of them
//! on rewind.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::{ClientConfig, Message, Offset, TopicPartitionList};
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use tokio::time::{Instant, timeout_at};
use tracing::{info, warn};

use crate::domain::ports::{BrokerError, EventBroker, EventPublisher, EventSubscription};
use crate::domain::{EventEnvelope, Topic};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);
const SEEK_TIMEOUT: Duration = Duration::from_secs(5);

fn unavailable(error: &KafkaError) -> BrokerError {
    BrokerError::unavailable(error.to_string())
}

/// Kafka publisher and subscription factory.
pub struct KafkaBroker {
    brokers: String,
    producer: FutureProducer,
}

impl KafkaBroker {
    /// Create a producer against the comma-separated `brokers` list.
    pub fn connect(brokers: &str) -> Result<Self, BrokerError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", DELIVERY_TIMEOUT.as_millis().to_string())
            .set("acks", "all")
            .create()
            .map_err(|err| unavailable(&err))?;
        Ok(Self {
            brokers: brokers.to_owned(),
            producer,
        })
    }
}

#[async_trait]
impl EventPublisher for KafkaBroker {
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), BrokerError> {
        let payload = envelope
            .to_bytes()
            .map_err(|err| BrokerError::codec(err.to_string()))?;
        let record = FutureRecord::to(envelope.topic.as_str())
            .key(envelope.key.as_str())
            .payload(&payload);
        self.producer
            .send(record, Timeout::After(DELIVERY_TIMEOUT))
            .await
            .map(|_| ())
            .map_err(|(err, _message)| unavailable(&err))
    }
}

#[async_trait]
impl EventBroker for KafkaBroker {
    async fn subscribe(
        &self,
        topic: Topic,
        group: &str,
    ) -> Result<Box<dyn EventSubscription>, BrokerError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", group)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|err| unavailable(&err))?;
        consumer
            .subscribe(&[topic.as_str()])
            .map_err(|err| unavailable(&err))?;
        info!(%topic, group, "kafka subscription started");
        Ok(Box::new(KafkaSubscription {
            topic,
            consumer,
            pending: HashMap::new(),
        }))
    }
}

/// First and last offset read from one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OffsetSpan {
    first: i64,
    last: i64,
}

/// Record `offset` on `partition`, widening any span already held.
fn track(pending: &mut HashMap<i32, OffsetSpan>, partition: i32, offset: i64) {
    pending
        .entry(partition)
        .and_modify(|span| {
            span.first = span.first.min(offset);
            span.last = span.last.max(offset);
        })
        .or_insert(OffsetSpan {
            first: offset,
            last: offset,
        });
}

struct KafkaSubscription {
    topic: Topic,
    consumer: StreamConsumer,
    /// Read since the last commit or rewind, keyed by partition.
    pending: HashMap<i32, OffsetSpan>,
}

impl KafkaSubscription {
    async fn recv(&mut self) -> Result<EventEnvelope, BrokerError> {
        loop {
            let decoded = match self.consumer.recv().await {
                Ok(message) => {
                    // Skipped messages are tracked too so a commit moves past them.
                    track(&mut self.pending, message.partition(), message.offset());
                    message.payload().map(EventEnvelope::from_bytes)
                }
                Err(err) => return Err(unavailable(&err)),
            };
            match decoded {
                Some(Ok(envelope)) => return Ok(envelope),
                Some(Err(err)) => {
                    warn!(topic = %self.topic, error = %err, "skipping undecodable message");
                }
                None => warn!(topic = %self.topic, "skipping message without payload"),
            }
        }
    }
}

#[async_trait]
impl EventSubscription for KafkaSubscription {
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
                Ok(Err(error)) => {
                    // Envelopes already read stay in this batch.
                    warn!(topic = %self.topic, %error, size = batch.len(), "batch cut short");
                    break;
                }
                Err(_elapsed) => break,
            }
        }
        Ok(batch)
    }

    async fn commit(&mut self) -> Result<(), BrokerError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut offsets = TopicPartitionList::new();
        for (partition, span) in &self.pending {
            offsets
                .add_partition_offset(
                    self.topic.as_str(),
                    *partition,
                    Offset::Offset(span.last + 1),
                )
                .map_err(|err| unavailable(&err))?;
        }
        self.consumer
            .commit(&offsets, CommitMode::Sync)
            .map_err(|err| unavailable(&err))?;
        self.pending.clear();
        Ok(())
    }

    async fn rewind(&mut self) -> Result<(), BrokerError> {
        for (partition, span) in &self.pending {
            self.consumer
                .seek(
                    self.topic.as_str(),
                    *partition,
                    Offset::Offset(span.first),
                    SEEK_TIMEOUT,
                )
                .map_err(|err| unavailable(&err))?;
        }
        self.pending.clear();
        Ok(())
    }
}
