//! Driving port for address operations.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Address, AddressDraft, Error, UserId};

/// Address CRUD under one of the caller's contacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressUsecase: Send + Sync {
    /// Validate and store a new address.
    async fn create(
        &self,
        user_id: &UserId,
        contact_id: Uuid,
        draft: AddressDraft,
    ) -> Result<Address, Error>;

    /// Load one address.
    async fn get(&self, user_id: &UserId, contact_id: Uuid, id: Uuid) -> Result<Address, Error>;

    /// Page through a contact's addresses.
    async fn list(
        &self,
        user_id: &UserId,
        contact_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Address>, Error>;

    /// Replace an address's fields.
    async fn update(
        &self,
        user_id: &UserId,
        contact_id: Uuid,
        id: Uuid,
        draft: AddressDraft,
    ) -> Result<Address, Error>;

    /// Delete an address.
    async fn delete(&self, user_id: &UserId, contact_id: Uuid, id: Uuid) -> Result<(), Error>;
}
