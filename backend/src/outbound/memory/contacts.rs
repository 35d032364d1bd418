use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{AddressRepository, ContactRepository, RepositoryError};
use crate::domain::{Address, Contact, ContactSearch, UserId};

use super::{lock, paginate};

/// In-memory contact storage.
#[derive(Default)]
pub struct InMemoryContactRepository {
    rows: Mutex<HashMap<Uuid, Contact>>,
}

impl InMemoryContactRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, contact: &Contact) -> Result<(), RepositoryError> {
        let mut rows = lock(&self.rows);
        if rows.contains_key(&contact.id) {
            return Err(RepositoryError::conflict("contacts_pkey"));
        }
        rows.insert(contact.id, contact.clone());
        Ok(())
    }

    async fn find(&self, user_id: &UserId, id: Uuid) -> Result<Option<Contact>, RepositoryError> {
        Ok(lock(&self.rows)
            .get(&id)
            .filter(|c| c.user_id == *user_id)
            .cloned())
    }

    async fn search(
        &self,
        user_id: &UserId,
        filter: &ContactSearch,
        page: PageRequest,
    ) -> Result<Page<Contact>, RepositoryError> {
        let matching = lock(&self.rows)
            .values()
            .filter(|c| c.user_id == *user_id && filter.matches(c))
            .cloned()
            .collect();
        Ok(paginate(matching, page, |c: &Contact| (c.created_at, c.id)))
    }

    async fn update(&self, contact: &Contact) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        match rows.get_mut(&contact.id) {
            Some(stored) if stored.user_id == contact.user_id => {
                *stored = contact.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        if rows.get(&id).is_some_and(|c| c.user_id == *user_id) {
            rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

/// In-memory address storage.
#[derive(Default)]
pub struct InMemoryAddressRepository {
    rows: Mutex<HashMap<Uuid, Address>>,
}

impl InMemoryAddressRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AddressRepository for InMemoryAddressRepository {
    async fn create(&self, address: &Address) -> Result<(), RepositoryError> {
        let mut rows = lock(&self.rows);
        if rows.contains_key(&address.id) {
            return Err(RepositoryError::conflict("addresses_pkey"));
        }
        rows.insert(address.id, address.clone());
        Ok(())
    }

    async fn find(&self, contact_id: Uuid, id: Uuid) -> Result<Option<Address>, RepositoryError> {
        Ok(lock(&self.rows)
            .get(&id)
            .filter(|a| a.contact_id == contact_id)
            .cloned())
    }

    async fn list(
        &self,
        contact_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Address>, RepositoryError> {
        let matching = lock(&self.rows)
            .values()
            .filter(|a| a.contact_id == contact_id)
            .cloned()
            .collect();
        Ok(paginate(matching, page, |a: &Address| (a.created_at, a.id)))
    }

    async fn update(&self, address: &Address) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        match rows.get_mut(&address.id) {
            Some(stored) if stored.contact_id == address.contact_id => {
                *stored = address.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, contact_id: Uuid, id: Uuid) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        if rows.get(&id).is_some_and(|a| a.contact_id == contact_id) {
            rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}
