//! Domain ports for hexagonal architecture.
//!
//! Driven ports (repositories, storage, broker, hashing) are implemented by
//! outbound adapters. Driving ports (`*Usecase`) are implemented by the domain
//! services and called by inbound adapters. Every async port is also wrapped
//! by the logging and telemetry decorators in [`crate::middleware`].

mod macros;

mod address_repository;
mod address_usecase;
mod contact_repository;
mod contact_usecase;
mod event_broker;
mod event_publisher;
mod image_repository;
mod image_store;
mod image_usecase;
mod password_hasher;
mod repository_error;
mod todo_repository;
mod todo_usecase;
mod user_repository;
mod user_usecase;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use address_repository::MockAddressRepository;
pub use address_repository::AddressRepository;
#[cfg(test)]
pub use address_usecase::MockAddressUsecase;
pub use address_usecase::AddressUsecase;
#[cfg(test)]
pub use contact_repository::MockContactRepository;
pub use contact_repository::ContactRepository;
#[cfg(test)]
pub use contact_usecase::MockContactUsecase;
pub use contact_usecase::ContactUsecase;
#[cfg(test)]
pub use event_broker::{MockEventBroker, MockEventSubscription};
pub use event_broker::{EventBroker, EventSubscription};
#[cfg(test)]
pub use event_publisher::MockEventPublisher;
pub use event_publisher::{BrokerError, EventPublisher};
#[cfg(test)]
pub use image_repository::MockImageRepository;
pub use image_repository::ImageRepository;
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, StorageError};
#[cfg(test)]
pub use image_usecase::MockImageUsecase;
pub use image_usecase::ImageUsecase;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{HashError, PasswordHasher};
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use todo_repository::MockTodoRepository;
pub use todo_repository::TodoRepository;
#[cfg(test)]
pub use todo_usecase::MockTodoUsecase;
pub use todo_usecase::TodoUsecase;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
#[cfg(test)]
pub use user_usecase::MockUserUsecase;
pub use user_usecase::UserUsecase;
