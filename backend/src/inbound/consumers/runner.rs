//! Per-topic consumer loop.
//!
//! Each loop fetches a batch, hands it to its [`EventHandler`], and commits
//! only after the handler succeeds. A failed batch is rewound and retried
//! after [`ConsumerSettings::retry_delay`]; if the rewind itself fails the loop
//! stops with the error rather than fetching past the batch. The loop exits
//! when the shutdown channel flips to `true` or its sender is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::domain::Topic;
use crate::domain::ports::{BrokerError, EventBroker, EventSubscription};
use crate::middleware::LoggedSubscription;

use super::handlers::EventHandler;

/// Batching and group settings shared by every consumer loop.
#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    pub group: String,
    pub batch_size: usize,
    pub linger: Duration,
    /// Pause after a failed fetch or batch before polling again.
    pub retry_delay: Duration,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            group: "contactbook".to_owned(),
            batch_size: 100,
            linger: Duration::from_millis(500),
            retry_delay: Duration::from_secs(1),
        }
    }
}

fn stopping(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

/// Sleep for `delay`; `false` when shutdown interrupted the pause.
async fn pause(shutdown: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    tokio::select! {
        biased;
        _ = shutdown.changed() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

/// Consume `topic` until shutdown.
pub async fn run_consumer(
    broker: Arc<dyn EventBroker>,
    topic: Topic,
    handler: Arc<dyn EventHandler>,
    settings: ConsumerSettings,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), BrokerError> {
    let inner = broker.subscribe(topic, &settings.group).await?;
    let mut subscription = LoggedSubscription::new(topic, inner);
    info!(%topic, handler = handler.name(), "consumer started");

    while !stopping(&shutdown) {
        let fetched = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            fetched = subscription.next_batch(settings.batch_size, settings.linger) => fetched,
        };
        let batch = match fetched {
            Ok(batch) => batch,
            Err(_) => {
                if pause(&mut shutdown, settings.retry_delay).await {
                    continue;
                }
                break;
            }
        };

        match handler.handle(&batch).await {
            // Commit failures are logged by the wrapper; the next commit covers them.
            Ok(()) => {
                if subscription.commit().await.is_ok() {
                    debug!(%topic, size = batch.len(), "batch committed");
                }
            }
            Err(error) => {
                warn!(%topic, size = batch.len(), %error, "batch failed; rewinding");
                subscription.rewind().await?;
                if !pause(&mut shutdown, settings.retry_delay).await {
                    break;
                }
            }
        }
    }

    info!(%topic, "consumer stopped");
    Ok(())
}

/// Spawn one consumer loop per `(topic, handler)` pair.
pub fn spawn_consumers(
    broker: &Arc<dyn EventBroker>,
    handlers: Vec<(Topic, Arc<dyn EventHandler>)>,
    settings: &ConsumerSettings,
    shutdown: &watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    handlers
        .into_iter()
        .map(|(topic, handler)| {
            let task = run_consumer(
                Arc::clone(broker),
                topic,
                handler,
                settings.clone(),
                shutdown.clone(),
            );
            tokio::spawn(
                async move {
                    if let Err(error) = task.await {
                        warn!(%topic, %error, "consumer stopped on broker error");
                    }
                }
                .instrument(info_span!("consumer", %topic)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::Sequence;
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    use crate::domain::ports::{MockEventBroker, MockEventSubscription, RepositoryError};
    use crate::domain::{EventEnvelope, EventKind};
    use crate::inbound::consumers::handlers::{HandlerError, MockEventHandler};

    fn batch() -> Vec<EventEnvelope> {
        let id = Uuid::new_v4();
        vec![
            EventEnvelope::new(
                Topic::Todos,
                id,
                EventKind::Created,
                Utc::now(),
                &json!({ "id": id }),
            )
            .expect("envelope"),
        ]
    }

    fn quick_retry() -> ConsumerSettings {
        ConsumerSettings {
            retry_delay: Duration::from_millis(1),
            ..ConsumerSettings::default()
        }
    }

    fn broker_with(subscription: MockEventSubscription) -> Arc<dyn EventBroker> {
        let mut broker = MockEventBroker::new();
        broker
            .expect_subscribe()
            .times(1)
            .return_once(move |_, _| Ok(Box::new(subscription)));
        Arc::new(broker)
    }

    fn handler_then_stop(
        outcome: Result<(), HandlerError>,
        stop: watch::Sender<bool>,
    ) -> Arc<dyn EventHandler> {
        let mut handler = MockEventHandler::new();
        handler.expect_name().return_const("test");
        handler.expect_handle().times(1).return_once(move |_| {
            let _sent = stop.send(true);
            outcome
        });
        Arc::new(handler)
    }

    #[rstest]
    #[tokio::test]
    async fn commits_after_successful_batch() {
        let (stop, shutdown) = watch::channel(false);
        let mut subscription = MockEventSubscription::new();
        subscription
            .expect_next_batch()
            .times(1)
            .returning(|_, _| Ok(batch()));
        subscription.expect_commit().times(1).returning(|| Ok(()));

        run_consumer(
            broker_with(subscription),
            Topic::Todos,
            handler_then_stop(Ok(()), stop),
            ConsumerSettings::default(),
            shutdown,
        )
        .await
        .expect("consumer exits cleanly");
    }

    #[rstest]
    #[tokio::test]
    async fn failed_batches_are_not_committed() {
        let (stop, shutdown) = watch::channel(false);
        let mut subscription = MockEventSubscription::new();
        subscription
            .expect_next_batch()
            .times(1)
            .returning(|_, _| Ok(batch()));
        subscription.expect_commit().never();
        subscription.expect_rewind().times(1).returning(|| Ok(()));
        let failure = HandlerError::Repository(RepositoryError::connection("down"));

        run_consumer(
            broker_with(subscription),
            Topic::Likes,
            handler_then_stop(Err(failure), stop),
            ConsumerSettings::default(),
            shutdown,
        )
        .await
        .expect("consumer exits cleanly");
    }

    #[rstest]
    #[tokio::test]
    async fn failed_batch_is_redelivered_before_later_commits() {
        let (stop, shutdown) = watch::channel(false);
        let first = batch();
        let redelivered = first.clone();
        let expected = first.clone();
        let mut order = Sequence::new();
        let mut subscription = MockEventSubscription::new();
        subscription
            .expect_next_batch()
            .times(1)
            .in_sequence(&mut order)
            .return_once(move |_, _| Ok(first));
        subscription
            .expect_rewind()
            .times(1)
            .in_sequence(&mut order)
            .returning(|| Ok(()));
        subscription
            .expect_next_batch()
            .times(1)
            .in_sequence(&mut order)
            .return_once(move |_, _| Ok(redelivered));
        subscription
            .expect_commit()
            .times(1)
            .in_sequence(&mut order)
            .returning(|| Ok(()));

        let mut handler = MockEventHandler::new();
        handler.expect_name().return_const("test");
        handler
            .expect_handle()
            .times(1)
            .in_sequence(&mut order)
            .return_once(|_| Err(HandlerError::Repository(RepositoryError::connection("down"))));
        handler
            .expect_handle()
            .times(1)
            .in_sequence(&mut order)
            .withf(move |batch| batch.to_vec() == expected)
            .return_once(move |_| {
                let _sent = stop.send(true);
                Ok(())
            });

        run_consumer(
            broker_with(subscription),
            Topic::Likes,
            Arc::new(handler),
            quick_retry(),
            shutdown,
        )
        .await
        .expect("consumer exits cleanly");
    }

    #[rstest]
    #[tokio::test]
    async fn failed_rewind_stops_the_loop() {
        let (_stop, shutdown) = watch::channel(false);
        let mut subscription = MockEventSubscription::new();
        subscription
            .expect_next_batch()
            .times(1)
            .returning(|_, _| Ok(batch()));
        subscription.expect_commit().never();
        subscription
            .expect_rewind()
            .times(1)
            .returning(|| Err(BrokerError::unavailable("seek failed")));
        let mut handler = MockEventHandler::new();
        handler.expect_name().return_const("test");
        handler
            .expect_handle()
            .times(1)
            .returning(|_| Err(HandlerError::Repository(RepositoryError::connection("down"))));

        let result = run_consumer(
            broker_with(subscription),
            Topic::Todos,
            Arc::new(handler),
            quick_retry(),
            shutdown,
        )
        .await;
        assert!(matches!(result, Err(BrokerError::Unavailable { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn stops_immediately_when_already_shut_down() {
        let (_stop, shutdown) = watch::channel(true);
        let mut subscription = MockEventSubscription::new();
        subscription.expect_next_batch().never();
        let mut handler = MockEventHandler::new();
        handler.expect_name().return_const("test");
        handler.expect_handle().never();

        run_consumer(
            broker_with(subscription),
            Topic::Users,
            Arc::new(handler),
            ConsumerSettings::default(),
            shutdown,
        )
        .await
        .expect("consumer exits cleanly");
    }

    #[rstest]
    #[tokio::test]
    async fn subscribe_failures_are_returned() {
        let (_stop, shutdown) = watch::channel(false);
        let mut broker = MockEventBroker::new();
        broker
            .expect_subscribe()
            .returning(|_, _| Err(BrokerError::unavailable("no brokers")));
        let handler = MockEventHandler::new();

        let result = run_consumer(
            Arc::new(broker),
            Topic::Users,
            Arc::new(handler),
            ConsumerSettings::default(),
            shutdown,
        )
        .await;
        assert!(matches!(result, Err(BrokerError::Unavailable { .. })));
    }
}
