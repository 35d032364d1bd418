//! Decorator wiring for every async port.
//!
//! `decorate_port!` restates a port's method list once and generates:
//! - `impl Port for Logged<dyn Port>`,
//! - `impl Port for Traced<dyn Port>`,
//! - `decorate_<port>(component, base)` returning `Traced(Logged(base))`.
//!
//! The restated signatures must match the trait exactly; a mismatch fails to
//! compile, so the lists cannot drift silently.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::Instrument;
use uuid::Uuid;

use super::logging::Logged;
use super::telemetry::{Traced, record_outcome};
use crate::domain::ports::{
    AddressRepository, AddressUsecase, BrokerError, ContactRepository, ContactUsecase,
    EventBroker, EventPublisher, EventSubscription, ImageRepository, ImageStore, ImageUsecase,
    RepositoryError, StorageError, TodoRepository, TodoUsecase, UserRepository, UserUsecase,
};
use crate::domain::{
    Address, AddressDraft, Comment, CommentDraft, Contact, ContactDraft, ContactSearch, Error,
    EventEnvelope, Image, ImageUpload, Like, LoginCredentials, ProfileUpdate, Registration,
    SessionToken, Todo, TodoDraft, TodoSearch, Topic, User, UserId,
};

macro_rules! decorate_port {
    (
        $port:ident {
            $(
                async fn $method:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty;
            )*
        }
    ) => {
        #[async_trait]
        impl $port for Logged<dyn $port> {
            $(
                async fn $method(&self $(, $arg: $ty)*) -> $ret {
                    let started = Instant::now();
                    let result = self.next().$method($($arg),*).await;
                    self.observe(stringify!($method), started, &result);
                    result
                }
            )*
        }

        #[async_trait]
        impl $port for Traced<dyn $port> {
            $(
                async fn $method(&self $(, $arg: $ty)*) -> $ret {
                    let span = self.span(stringify!($method));
                    let result = self
                        .next()
                        .$method($($arg),*)
                        .instrument(span.clone())
                        .await;
                    record_outcome(&span, &result);
                    result
                }
            )*
        }

        ::paste::paste! {
            #[doc = "Wrap a `" $port "` in the logging and telemetry decorators."]
            pub fn [<decorate_ $port:snake>](
                component: &'static str,
                base: Arc<dyn $port>,
            ) -> Arc<dyn $port> {
                let logged: Arc<dyn $port> = Arc::new(Logged::new(component, base));
                Arc::new(Traced::new(component, logged))
            }
        }
    };
}

decorate_port!(UserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_by_token(&self, fingerprint: &str) -> Result<Option<User>, RepositoryError>;
    async fn update(&self, user: &User) -> Result<bool, RepositoryError>;
    async fn set_token(&self, id: &UserId, fingerprint: Option<String>) -> Result<bool, RepositoryError>;
});

decorate_port!(ContactRepository {
    async fn create(&self, contact: &Contact) -> Result<(), RepositoryError>;
    async fn find(&self, user_id: &UserId, id: Uuid) -> Result<Option<Contact>, RepositoryError>;
    async fn search(&self, user_id: &UserId, filter: &ContactSearch, page: PageRequest) -> Result<Page<Contact>, RepositoryError>;
    async fn update(&self, contact: &Contact) -> Result<bool, RepositoryError>;
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError>;
});

decorate_port!(AddressRepository {
    async fn create(&self, address: &Address) -> Result<(), RepositoryError>;
    async fn find(&self, contact_id: Uuid, id: Uuid) -> Result<Option<Address>, RepositoryError>;
    async fn list(&self, contact_id: Uuid, page: PageRequest) -> Result<Page<Address>, RepositoryError>;
    async fn update(&self, address: &Address) -> Result<bool, RepositoryError>;
    async fn delete(&self, contact_id: Uuid, id: Uuid) -> Result<bool, RepositoryError>;
});

decorate_port!(TodoRepository {
    async fn create(&self, todo: &Todo) -> Result<(), RepositoryError>;
    async fn find(&self, user_id: &UserId, id: Uuid) -> Result<Option<Todo>, RepositoryError>;
    async fn search(&self, user_id: &UserId, filter: &TodoSearch, page: PageRequest) -> Result<Page<Todo>, RepositoryError>;
    async fn update(&self, todo: &Todo) -> Result<bool, RepositoryError>;
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError>;
});

decorate_port!(ImageRepository {
    async fn create(&self, image: &Image) -> Result<(), RepositoryError>;
    async fn find(&self, id: Uuid) -> Result<Option<Image>, RepositoryError>;
    async fn list_by_owner(&self, user_id: &UserId, page: PageRequest) -> Result<Page<Image>, RepositoryError>;
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError>;
    async fn add_like(&self, like: &Like) -> Result<(), RepositoryError>;
    async fn remove_like(&self, image_id: Uuid, user_id: &UserId) -> Result<bool, RepositoryError>;
    async fn add_comment(&self, comment: &Comment) -> Result<(), RepositoryError>;
    async fn list_comments(&self, image_id: Uuid, page: PageRequest) -> Result<Page<Comment>, RepositoryError>;
    async fn refresh_counters(&self, image_id: Uuid) -> Result<(), RepositoryError>;
});

decorate_port!(ImageStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
});

decorate_port!(EventPublisher {
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), BrokerError>;
});

decorate_port!(EventBroker {
    async fn subscribe(&self, topic: Topic, group: &str) -> Result<Box<dyn EventSubscription>, BrokerError>;
});

decorate_port!(UserUsecase {
    async fn register(&self, registration: Registration) -> Result<User, Error>;
    async fn login(&self, credentials: LoginCredentials) -> Result<SessionToken, Error>;
    async fn logout(&self, user_id: &UserId) -> Result<(), Error>;
    async fn authenticate(&self, token: &str) -> Result<User, Error>;
    async fn current(&self, user_id: &UserId) -> Result<User, Error>;
    async fn update_current(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User, Error>;
});

decorate_port!(ContactUsecase {
    async fn create(&self, user_id: &UserId, draft: ContactDraft) -> Result<Contact, Error>;
    async fn get(&self, user_id: &UserId, id: Uuid) -> Result<Contact, Error>;
    async fn search(&self, user_id: &UserId, filter: ContactSearch, page: PageRequest) -> Result<Page<Contact>, Error>;
    async fn update(&self, user_id: &UserId, id: Uuid, draft: ContactDraft) -> Result<Contact, Error>;
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<(), Error>;
});

decorate_port!(AddressUsecase {
    async fn create(&self, user_id: &UserId, contact_id: Uuid, draft: AddressDraft) -> Result<Address, Error>;
    async fn get(&self, user_id: &UserId, contact_id: Uuid, id: Uuid) -> Result<Address, Error>;
    async fn list(&self, user_id: &UserId, contact_id: Uuid, page: PageRequest) -> Result<Page<Address>, Error>;
    async fn update(&self, user_id: &UserId, contact_id: Uuid, id: Uuid, draft: AddressDraft) -> Result<Address, Error>;
    async fn delete(&self, user_id: &UserId, contact_id: Uuid, id: Uuid) -> Result<(), Error>;
});

decorate_port!(TodoUsecase {
    async fn create(&self, user_id: &UserId, draft: TodoDraft) -> Result<Todo, Error>;
    async fn get(&self, user_id: &UserId, id: Uuid) -> Result<Todo, Error>;
    async fn search(&self, user_id: &UserId, filter: TodoSearch, page: PageRequest) -> Result<Page<Todo>, Error>;
    async fn update(&self, user_id: &UserId, id: Uuid, draft: TodoDraft) -> Result<Todo, Error>;
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<(), Error>;
    async fn complete(&self, user_id: &UserId, id: Uuid) -> Result<Todo, Error>;
});

decorate_port!(ImageUsecase {
    async fn upload(&self, user_id: &UserId, upload: ImageUpload) -> Result<Image, Error>;
    async fn get(&self, id: Uuid) -> Result<Image, Error>;
    async fn content(&self, id: Uuid) -> Result<(Image, Vec<u8>), Error>;
    async fn list(&self, user_id: &UserId, page: PageRequest) -> Result<Page<Image>, Error>;
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<(), Error>;
    async fn like(&self, user_id: &UserId, image_id: Uuid) -> Result<Like, Error>;
    async fn unlike(&self, user_id: &UserId, image_id: Uuid) -> Result<(), Error>;
    async fn comment(&self, user_id: &UserId, image_id: Uuid, draft: CommentDraft) -> Result<Comment, Error>;
    async fn comments(&self, image_id: Uuid, page: PageRequest) -> Result<Page<Comment>, Error>;
});

/// Subscription wrapper logging batch sizes and commit failures.
///
/// Subscriptions take `&mut self`, so they are decorated by hand rather than
/// through `decorate_port!`.
pub struct LoggedSubscription {
    topic: Topic,
    next: Box<dyn EventSubscription>,
}

impl LoggedSubscription {
    /// Wrap a live subscription for `topic`.
    pub fn new(topic: Topic, next: Box<dyn EventSubscription>) -> Self {
        Self { topic, next }
    }
}

#[async_trait]
impl EventSubscription for LoggedSubscription {
    async fn next_batch(
        &mut self,
        max: usize,
        linger: Duration,
    ) -> Result<Vec<EventEnvelope>, BrokerError> {
        let result = self.next.next_batch(max, linger).await;
        match &result {
            Ok(batch) => tracing::debug!(topic = %self.topic, size = batch.len(), "batch fetched"),
            Err(error) => tracing::warn!(topic = %self.topic, %error, "batch fetch failed"),
        }
        result
    }

    async fn commit(&mut self) -> Result<(), BrokerError> {
        let result = self.next.commit().await;
        if let Err(error) = &result {
            tracing::warn!(topic = %self.topic, %error, "offset commit failed");
        }
        result
    }

    async fn rewind(&mut self) -> Result<(), BrokerError> {
        let result = self.next.rewind().await;
        match &result {
            Ok(()) => tracing::debug!(topic = %self.topic, "subscription rewound"),
            Err(error) => tracing::warn!(topic = %self.topic, %error, "rewind failed"),
        }
        result
    }
}
