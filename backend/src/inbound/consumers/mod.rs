//! Broker consumers: one loop per topic, committing after each handled batch.

pub mod handlers;
pub mod runner;

pub use handlers::{EventHandler, HandlerError, ImageCounterHandler, LoggingHandler, default_handlers};
pub use runner::{ConsumerSettings, run_consumer, spawn_consumers};
