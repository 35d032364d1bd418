//! Builders for the outbound adapter set and the HTTP state on top of it.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::domain::ports::{
    AddressRepository, ContactRepository, EventBroker, EventPublisher, ImageRepository,
    ImageStore, PasswordHasher, TodoRepository, UserRepository,
};
use crate::domain::{AddressService, ContactService, ImageService, TodoService, UserService};
use crate::inbound::http::state::HttpState;
use crate::middleware::{
    decorate_address_repository, decorate_address_usecase, decorate_contact_repository,
    decorate_contact_usecase, decorate_event_broker, decorate_event_publisher,
    decorate_image_repository, decorate_image_store, decorate_image_usecase,
    decorate_todo_repository, decorate_todo_usecase, decorate_user_repository,
    decorate_user_usecase,
};
#[cfg(feature = "kafka")]
use crate::outbound::broker::KafkaBroker;
use crate::outbound::broker::InMemoryBroker;
use crate::outbound::memory::{
    InMemoryAddressRepository, InMemoryContactRepository, InMemoryImageRepository,
    InMemoryTodoRepository, InMemoryUserRepository,
};
use crate::outbound::persistence::{
    DbPool, DieselAddressRepository, DieselContactRepository, DieselImageRepository,
    DieselTodoRepository, DieselUserRepository, PoolConfig, run_migrations,
};
use crate::outbound::security::Argon2PasswordHasher;
use crate::outbound::storage::{FsImageStore, InMemoryImageStore};

use super::StartupError;
use super::config::{AppSettings, BrokerKind};

/// Repositories, blob store and broker handles shared by HTTP and consumers.
#[derive(Clone)]
pub struct Adapters {
    pub users: Arc<dyn UserRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub todos: Arc<dyn TodoRepository>,
    pub images: Arc<dyn ImageRepository>,
    pub store: Arc<dyn ImageStore>,
    pub publisher: Arc<dyn EventPublisher>,
    pub broker: Arc<dyn EventBroker>,
    pub hasher: Arc<dyn PasswordHasher>,
}

impl Adapters {
    /// Process-local adapters: in-memory tables, blobs and broker.
    pub fn in_memory() -> Self {
        let broker = Arc::new(InMemoryBroker::new());
        let publisher: Arc<dyn EventPublisher> = broker.clone();
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            contacts: Arc::new(InMemoryContactRepository::new()),
            addresses: Arc::new(InMemoryAddressRepository::new()),
            todos: Arc::new(InMemoryTodoRepository::new()),
            images: Arc::new(InMemoryImageRepository::new()),
            store: Arc::new(InMemoryImageStore::new()),
            publisher,
            broker,
            hasher: Arc::new(Argon2PasswordHasher::new()),
        }
        .decorated()
    }

    /// Wrap every async port in the logging and telemetry decorators.
    fn decorated(self) -> Self {
        Self {
            users: decorate_user_repository("user_repository", self.users),
            contacts: decorate_contact_repository("contact_repository", self.contacts),
            addresses: decorate_address_repository("address_repository", self.addresses),
            todos: decorate_todo_repository("todo_repository", self.todos),
            images: decorate_image_repository("image_repository", self.images),
            store: decorate_image_store("image_store", self.store),
            publisher: decorate_event_publisher("event_publisher", self.publisher),
            broker: decorate_event_broker("event_broker", self.broker),
            hasher: self.hasher,
        }
    }
}

type BrokerPair = (Arc<dyn EventPublisher>, Arc<dyn EventBroker>);

fn build_broker(settings: &AppSettings) -> Result<BrokerPair, StartupError> {
    match settings.broker_kind()? {
        BrokerKind::Memory => {
            let broker = Arc::new(InMemoryBroker::new());
            let publisher: Arc<dyn EventPublisher> = broker.clone();
            let consumer: Arc<dyn EventBroker> = broker;
            Ok((publisher, consumer))
        }
        #[cfg(feature = "kafka")]
        BrokerKind::Kafka => {
            let broker = Arc::new(KafkaBroker::connect(settings.kafka_brokers()?)?);
            let publisher: Arc<dyn EventPublisher> = broker.clone();
            let consumer: Arc<dyn EventBroker> = broker;
            Ok((publisher, consumer))
        }
        #[cfg(not(feature = "kafka"))]
        BrokerKind::Kafka => Err(StartupError::KafkaDisabled),
    }
}

/// Build adapters from settings.
///
/// PostgreSQL repositories are used when a database URL is configured,
/// in-memory tables otherwise. Image bytes always live under the configured
/// image directory.
///
/// # Errors
///
/// Fails when the pool, migrations, image directory or broker cannot be set
/// up.
pub async fn build_adapters(settings: &AppSettings) -> Result<Adapters, StartupError> {
    let (publisher, broker) = build_broker(settings)?;
    let store: Arc<dyn ImageStore> = Arc::new(FsImageStore::open(settings.image_dir())?);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

    let adapters = match settings.database_url() {
        Some(url) => {
            if settings.run_migrations() {
                run_migrations(url).await?;
            }
            let pool =
                DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size())).await?;
            info!(max_size = settings.pool_max_size(), "using PostgreSQL repositories");
            Adapters {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                contacts: Arc::new(DieselContactRepository::new(pool.clone())),
                addresses: Arc::new(DieselAddressRepository::new(pool.clone())),
                todos: Arc::new(DieselTodoRepository::new(pool.clone())),
                images: Arc::new(DieselImageRepository::new(pool)),
                store,
                publisher,
                broker,
                hasher,
            }
        }
        None => {
            info!("no database configured; using in-memory repositories");
            Adapters {
                users: Arc::new(InMemoryUserRepository::new()),
                contacts: Arc::new(InMemoryContactRepository::new()),
                addresses: Arc::new(InMemoryAddressRepository::new()),
                todos: Arc::new(InMemoryTodoRepository::new()),
                images: Arc::new(InMemoryImageRepository::new()),
                store,
                publisher,
                broker,
                hasher,
            }
        }
    };
    Ok(adapters.decorated())
}

/// Build the services over `adapters` and wrap each usecase in decorators.
pub fn build_http_state(adapters: &Adapters) -> HttpState {
    build_http_state_with_clock(adapters, Arc::new(DefaultClock))
}

/// As [`build_http_state`] with an explicit clock.
pub fn build_http_state_with_clock(adapters: &Adapters, clock: Arc<dyn Clock>) -> HttpState {
    let publisher = &adapters.publisher;
    HttpState {
        users: decorate_user_usecase(
            "user_service",
            Arc::new(UserService::new(
                Arc::clone(&adapters.users),
                Arc::clone(&adapters.hasher),
                Arc::clone(publisher),
                Arc::clone(&clock),
            )),
        ),
        contacts: decorate_contact_usecase(
            "contact_service",
            Arc::new(ContactService::new(
                Arc::clone(&adapters.contacts),
                Arc::clone(publisher),
                Arc::clone(&clock),
            )),
        ),
        addresses: decorate_address_usecase(
            "address_service",
            Arc::new(AddressService::new(
                Arc::clone(&adapters.addresses),
                Arc::clone(&adapters.contacts),
                Arc::clone(publisher),
                Arc::clone(&clock),
            )),
        ),
        todos: decorate_todo_usecase(
            "todo_service",
            Arc::new(TodoService::new(
                Arc::clone(&adapters.todos),
                Arc::clone(publisher),
                Arc::clone(&clock),
            )),
        ),
        images: decorate_image_usecase(
            "image_service",
            Arc::new(ImageService::new(
                Arc::clone(&adapters.images),
                Arc::clone(&adapters.store),
                Arc::clone(publisher),
                clock,
            )),
        ),
    }
}
