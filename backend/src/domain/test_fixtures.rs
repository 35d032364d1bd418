//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::ports::MockEventPublisher;
use super::{EventKind, Topic, UserId};

/// Clock frozen at a fixed instant.
pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn owner() -> UserId {
    UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid user id")
}

/// Publisher expecting exactly one event of the given topic and kind.
pub(crate) fn expect_event(topic: Topic, kind: EventKind) -> MockEventPublisher {
    let mut publisher = MockEventPublisher::new();
    publisher
        .expect_publish()
        .withf(move |envelope| envelope.topic == topic && envelope.kind == kind)
        .times(1)
        .returning(|_| Ok(()));
    publisher
}

/// Publisher that must never be called.
pub(crate) fn no_events() -> MockEventPublisher {
    let mut publisher = MockEventPublisher::new();
    publisher.expect_publish().never();
    publisher
}
