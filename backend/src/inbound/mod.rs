//! Inbound adapters: the HTTP API and the broker consumers.

pub mod consumers;
pub mod http;
