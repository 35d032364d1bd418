//! Port for contact persistence.
//!
//! Every read and write is scoped by the owning user; a contact owned by
//! someone else behaves exactly like a missing one.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Contact, ContactSearch, UserId};

use super::RepositoryError;

/// Port for storing and querying contacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert a new contact.
    async fn create(&self, contact: &Contact) -> Result<(), RepositoryError>;

    /// Load a contact owned by `user_id`.
    async fn find(&self, user_id: &UserId, id: Uuid) -> Result<Option<Contact>, RepositoryError>;

    /// Filter the owner's contacts and return one page plus the total count.
    async fn search(
        &self,
        user_id: &UserId,
        filter: &ContactSearch,
        page: PageRequest,
    ) -> Result<Page<Contact>, RepositoryError>;

    /// Overwrite a contact, matching on both id and owner.
    async fn update(&self, contact: &Contact) -> Result<bool, RepositoryError>;

    /// Delete a contact and its addresses, matching on both id and owner.
    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError>;
}
