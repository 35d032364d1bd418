//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between Diesel rows and domain entities and map
//! driver failures to [`RepositoryError`](crate::domain::ports::RepositoryError).
//! Rows (`models.rs`) and table definitions (`schema.rs`) stay private.
//!
//! ```ignore
//! use contactbook::outbound::persistence::{DbPool, DieselContactRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/contactbook")).await?;
//! let contacts = DieselContactRepository::new(pool);
//! ```

mod diesel_address_repository;
mod diesel_contact_repository;
pub(crate) mod diesel_helpers;
mod diesel_image_repository;
mod diesel_todo_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_address_repository::DieselAddressRepository;
pub use diesel_contact_repository::DieselContactRepository;
pub use diesel_image_repository::DieselImageRepository;
pub use diesel_todo_repository::DieselTodoRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
