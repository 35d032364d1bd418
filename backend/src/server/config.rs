//! Service configuration loaded via OrthoConfig.
//!
//! Values merge from CLI flags, `CONTACTBOOK_*` environment variables and
//! configuration files. Every field is optional; the accessors supply the
//! defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::inbound::consumers::ConsumerSettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IMAGE_DIR: &str = "./data/images";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_CONSUMER_GROUP: &str = "contactbook";
const DEFAULT_BATCH_SIZE: usize = 100;
const DEFAULT_LINGER_MS: u64 = 500;

/// Settings that cannot be turned into a running service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("unknown broker {0:?}; expected \"memory\" or \"kafka\"")]
    UnknownBroker(String),
    #[error("the kafka broker requires CONTACTBOOK_KAFKA_BROKERS")]
    MissingKafkaBrokers,
    #[error("consumer batch size must be at least 1")]
    EmptyBatch,
}

/// Event broker backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerKind {
    /// Process-local broadcast channels.
    Memory,
    /// Kafka via librdkafka; needs the `kafka` feature.
    Kafka,
}

impl FromStr for BrokerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "kafka" => Ok(Self::Kafka),
            _ => Err(ConfigError::UnknownBroker(s.to_owned())),
        }
    }
}

/// Top-level service settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CONTACTBOOK")]
pub struct AppSettings {
    /// Socket address for the HTTP listener.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. In-memory repositories are used when unset.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Apply embedded migrations at startup (default: true).
    pub run_migrations: Option<bool>,
    /// Directory holding uploaded image bytes.
    pub image_dir: Option<PathBuf>,
    /// `memory` or `kafka`.
    pub broker: Option<String>,
    /// Comma separated bootstrap servers for Kafka.
    pub kafka_brokers: Option<String>,
    /// Consumer group shared by every consumer loop.
    pub consumer_group: Option<String>,
    pub consumer_batch_size: Option<usize>,
    pub consumer_linger_ms: Option<u64>,
}

impl AppSettings {
    /// Parsed listener address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| ConfigError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE).max(1)
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn image_dir(&self) -> &Path {
        self.image_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_IMAGE_DIR))
    }

    /// Selected broker backend (default: memory).
    pub fn broker_kind(&self) -> Result<BrokerKind, ConfigError> {
        self.broker
            .as_deref()
            .map_or(Ok(BrokerKind::Memory), BrokerKind::from_str)
    }

    /// Kafka bootstrap servers; required when the Kafka broker is selected.
    pub fn kafka_brokers(&self) -> Result<&str, ConfigError> {
        self.kafka_brokers
            .as_deref()
            .map(str::trim)
            .filter(|brokers| !brokers.is_empty())
            .ok_or(ConfigError::MissingKafkaBrokers)
    }

    /// Batching settings for the consumer loops.
    pub fn consumer_settings(&self) -> Result<ConsumerSettings, ConfigError> {
        let batch_size = self.consumer_batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        Ok(ConsumerSettings {
            group: self
                .consumer_group
                .clone()
                .unwrap_or_else(|| DEFAULT_CONSUMER_GROUP.to_owned()),
            batch_size,
            linger: Duration::from_millis(self.consumer_linger_ms.unwrap_or(DEFAULT_LINGER_MS)),
            ..ConsumerSettings::default()
        })
    }
}
