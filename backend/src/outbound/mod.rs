//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel, plus migrations
//! - **memory**: in-process repositories for tests and database-less runs
//! - **storage**: image content on disk (`cap-std`) or in memory
//! - **broker**: event publishing and batched consumption
//! - **security**: Argon2id password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They hold no business rules.

pub mod broker;
pub mod memory;
pub mod persistence;
pub mod security;
pub mod storage;
