//! Driving port for contact operations.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Contact, ContactDraft, ContactSearch, Error, UserId};

/// Contact CRUD and search, always scoped to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactUsecase: Send + Sync {
    /// Validate and store a new contact.
    async fn create(&self, user_id: &UserId, draft: ContactDraft) -> Result<Contact, Error>;

    /// Load one of the caller's contacts.
    async fn get(&self, user_id: &UserId, id: Uuid) -> Result<Contact, Error>;

    /// Filter and page through the caller's contacts.
    async fn search(
        &self,
        user_id: &UserId,
        filter: ContactSearch,
        page: PageRequest,
    ) -> Result<Page<Contact>, Error>;

    /// Replace a contact's fields.
    async fn update(&self, user_id: &UserId, id: Uuid, draft: ContactDraft)
    -> Result<Contact, Error>;

    /// Delete a contact and its addresses.
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<(), Error>;
}
