//! Port for address persistence.
//!
//! Addresses are scoped by their parent contact. Callers check that the
//! contact belongs to the requesting user before touching its addresses.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::Address;

use super::RepositoryError;

/// Port for storing and querying addresses under a contact.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Insert a new address.
    async fn create(&self, address: &Address) -> Result<(), RepositoryError>;

    /// Load an address belonging to `contact_id`.
    async fn find(&self, contact_id: Uuid, id: Uuid) -> Result<Option<Address>, RepositoryError>;

    /// Page through a contact's addresses.
    async fn list(
        &self,
        contact_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Address>, RepositoryError>;

    /// Overwrite an address, matching on both id and contact.
    async fn update(&self, address: &Address) -> Result<bool, RepositoryError>;

    /// Delete an address, matching on both id and contact.
    async fn delete(&self, contact_id: Uuid, id: Uuid) -> Result<bool, RepositoryError>;
}
