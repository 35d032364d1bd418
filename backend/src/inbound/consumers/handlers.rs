//! Batch handlers bound to broker topics.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{ImageRepository, RepositoryError};
use crate::domain::{EventEnvelope, Topic};

/// Failure while handling a batch; the batch stays uncommitted.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Processes one batch of envelopes from a single topic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Handle the whole batch. Returning `Ok` lets the runner commit.
    async fn handle(&self, batch: &[EventEnvelope]) -> Result<(), HandlerError>;
}

/// Records every envelope in the structured log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

#[async_trait]
impl EventHandler for LoggingHandler {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn handle(&self, batch: &[EventEnvelope]) -> Result<(), HandlerError> {
        for envelope in batch {
            info!(
                topic = %envelope.topic,
                kind = ?envelope.kind,
                key = %envelope.key,
                event_id = %envelope.event_id,
                "event received"
            );
        }
        Ok(())
    }
}

/// Recomputes like and comment counters for every image touched by a batch.
///
/// Counters are recounted from the source tables, so replaying a batch after
/// a failed commit converges on the same values.
pub struct ImageCounterHandler {
    images: Arc<dyn ImageRepository>,
}

impl ImageCounterHandler {
    pub fn new(images: Arc<dyn ImageRepository>) -> Self {
        Self { images }
    }
}

fn touched_images(batch: &[EventEnvelope]) -> BTreeSet<Uuid> {
    batch
        .iter()
        .filter_map(|envelope| match Uuid::parse_str(&envelope.key) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(key = %envelope.key, error = %err, "envelope key is not an image id");
                None
            }
        })
        .collect()
}

#[async_trait]
impl EventHandler for ImageCounterHandler {
    fn name(&self) -> &'static str {
        "image_counters"
    }

    async fn handle(&self, batch: &[EventEnvelope]) -> Result<(), HandlerError> {
        for image_id in touched_images(batch) {
            self.images.refresh_counters(image_id).await?;
        }
        Ok(())
    }
}

/// Handler assignment for every topic.
pub fn default_handlers(images: Arc<dyn ImageRepository>) -> Vec<(Topic, Arc<dyn EventHandler>)> {
    let counters: Arc<dyn EventHandler> = Arc::new(ImageCounterHandler::new(images));
    Topic::ALL
        .into_iter()
        .map(|topic| {
            let handler: Arc<dyn EventHandler> = match topic {
                Topic::Likes | Topic::Comments => Arc::clone(&counters),
                Topic::Users
                | Topic::Contacts
                | Topic::Addresses
                | Topic::Todos
                | Topic::Images => Arc::new(LoggingHandler),
            };
            (topic, handler)
        })
        .collect()
}
