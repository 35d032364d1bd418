//! Domain events published after successful writes.
//!
//! Every entity kind has its own topic. Envelopes are JSON documents keyed by
//! the entity id so a partitioned broker keeps per-entity ordering.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Broker topic, one per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Users,
    Contacts,
    Addresses,
    Todos,
    Images,
    Likes,
    Comments,
}

impl Topic {
    /// Every topic, in a stable order.
    pub const ALL: [Topic; 7] = [
        Topic::Users,
        Topic::Contacts,
        Topic::Addresses,
        Topic::Todos,
        Topic::Images,
        Topic::Likes,
        Topic::Comments,
    ];

    /// Wire name of the topic.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Users => "users",
            Topic::Contacts => "contacts",
            Topic::Addresses => "addresses",
            Topic::Todos => "todos",
            Topic::Images => "images",
            Topic::Likes => "likes",
            Topic::Comments => "comments",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| format!("unknown topic: {s}"))
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
    Completed,
    LoggedIn,
    LoggedOut,
}

/// JSON envelope carried on the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub topic: Topic,
    /// Entity id; used as the message key.
    pub key: String,
    pub kind: EventKind,
    pub occurred_at: DateTime<Utc>,
    pub payload: Value,
}

impl EventEnvelope {
    /// Build an envelope around a serialisable payload.
    pub fn new<P: Serialize>(
        topic: Topic,
        key: impl fmt::Display,
        kind: EventKind,
        occurred_at: DateTime<Utc>,
        payload: &P,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id: Uuid::new_v4(),
            topic,
            key: key.to_string(),
            kind,
            occurred_at,
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Encode for the wire.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from the wire.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn topics_parse_from_wire_names() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>(), Ok(topic));
        }
        assert!("widgets".parse::<Topic>().is_err());
    }

    #[rstest]
    fn envelope_uses_snake_case_kinds_and_entity_key() {
        let id = Uuid::new_v4();
        let envelope = EventEnvelope::new(
            Topic::Todos,
            id,
            EventKind::Completed,
            Utc::now(),
            &json!({ "id": id }),
        )
        .expect("build envelope");
        let value: Value =
            serde_json::from_slice(&envelope.to_bytes().expect("encode")).expect("json");
        assert_eq!(value["kind"], json!("completed"));
        assert_eq!(value["topic"], json!("todos"));
        assert_eq!(value["key"], json!(id.to_string()));
    }

    #[rstest]
    fn rejects_malformed_bytes() {
        assert!(EventEnvelope::from_bytes(b"{not json").is_err());
    }
}
