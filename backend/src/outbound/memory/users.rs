use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{User, UserId};

use super::lock;

#[derive(Default)]
struct UserTable {
    users: HashMap<Uuid, User>,
    tokens: HashMap<Uuid, String>,
}

/// In-memory account storage with a unique username index.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut table = lock(&self.table);
        if table.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::conflict("users_username_key"));
        }
        if table.users.contains_key(user.id.as_uuid()) {
            return Err(RepositoryError::conflict("users_pkey"));
        }
        table.users.insert(*user.id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.table).users.get(id.as_uuid()).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.table)
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_token(&self, fingerprint: &str) -> Result<Option<User>, RepositoryError> {
        let table = lock(&self.table);
        Ok(table
            .tokens
            .iter()
            .find(|(_, stored)| stored.as_str() == fingerprint)
            .and_then(|(id, _)| table.users.get(id))
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<bool, RepositoryError> {
        let mut table = lock(&self.table);
        match table.users.get_mut(user.id.as_uuid()) {
            Some(stored) => {
                stored.name.clone_from(&user.name);
                stored.password_hash.clone_from(&user.password_hash);
                stored.updated_at = user.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_token(
        &self,
        id: &UserId,
        fingerprint: Option<String>,
    ) -> Result<bool, RepositoryError> {
        let mut table = lock(&self.table);
        if !table.users.contains_key(id.as_uuid()) {
            return Ok(false);
        }
        match fingerprint {
            Some(value) => table.tokens.insert(*id.as_uuid(), value),
            None => table.tokens.remove(id.as_uuid()),
        };
        Ok(true)
    }
}
