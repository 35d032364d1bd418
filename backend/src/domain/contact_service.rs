//! Contact service implementing [`ContactUsecase`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use uuid::Uuid;

use super::ports::{ContactRepository, ContactUsecase, EventPublisher};
use super::service_support::{publish, repository_fault};
use super::{Contact, ContactDraft, ContactSearch, Error, EventKind, Topic, UserId};

/// Contact service.
#[derive(Clone)]
pub struct ContactService {
    contacts: Arc<dyn ContactRepository>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ContactService {
    /// Create the service from its collaborators.
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            contacts,
            publisher,
            clock,
        }
    }
}

#[async_trait]
impl ContactUsecase for ContactService {
    async fn create(&self, user_id: &UserId, draft: ContactDraft) -> Result<Contact, Error> {
        draft.validate()?;
        let contact = Contact::create(*user_id, draft, self.clock.utc());
        self.contacts
            .create(&contact)
            .await
            .map_err(|err| repository_fault("insert contact", err))?;

        publish(
            self.publisher.as_ref(),
            Topic::Contacts,
            contact.id,
            EventKind::Created,
            contact.created_at,
            &contact,
        )
        .await?;
        Ok(contact)
    }

    async fn get(&self, user_id: &UserId, id: Uuid) -> Result<Contact, Error> {
        self.contacts
            .find(user_id, id)
            .await
            .map_err(|err| repository_fault("find contact", err))?
            .ok_or_else(|| Error::not_found("contact not found"))
    }

    async fn search(
        &self,
        user_id: &UserId,
        filter: ContactSearch,
        page: PageRequest,
    ) -> Result<Page<Contact>, Error> {
        Ok(self
            .contacts
            .search(user_id, &filter, page)
            .await
            .map_err(|err| repository_fault("search contacts", err))?)
    }

    async fn update(
        &self,
        user_id: &UserId,
        id: Uuid,
        draft: ContactDraft,
    ) -> Result<Contact, Error> {
        draft.validate()?;
        let mut contact = self.get(user_id, id).await?;
        contact.apply(draft, self.clock.utc());

        let updated = self
            .contacts
            .update(&contact)
            .await
            .map_err(|err| repository_fault("update contact", err))?;
        if !updated {
            return Err(Error::not_found("contact not found"));
        }

        publish(
            self.publisher.as_ref(),
            Topic::Contacts,
            contact.id,
            EventKind::Updated,
            contact.updated_at,
            &contact,
        )
        .await?;
        Ok(contact)
    }

    async fn delete(&self, user_id: &UserId, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .contacts
            .delete(user_id, id)
            .await
            .map_err(|err| repository_fault("delete contact", err))?;
        if !deleted {
            return Err(Error::not_found("contact not found"));
        }

        publish(
            self.publisher.as_ref(),
            Topic::Contacts,
            id,
            EventKind::Deleted,
            self.clock.utc(),
            &json!({ "id": id, "user_id": user_id }),
        )
        .await?;
        Ok(())
    }
}
