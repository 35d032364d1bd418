//! Address service implementing [`AddressUsecase`].
//!
//! Every operation first confirms that the parent contact belongs to the
//! caller, then scopes the address query by that contact.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use uuid::Uuid;

use super::ports::{AddressRepository, AddressUsecase, ContactRepository, EventPublisher};
use super::service_support::{publish, repository_fault};
use super::{Address, AddressDraft, Error, EventKind, Topic, UserId};

/// Address service.
#[derive(Clone)]
pub struct AddressService {
    addresses: Arc<dyn AddressRepository>,
    contacts: Arc<dyn ContactRepository>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl AddressService {
    /// Create the service from its collaborators.
    pub fn new(
        addresses: Arc<dyn AddressRepository>,
        contacts: Arc<dyn ContactRepository>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            addresses,
            contacts,
            publisher,
            clock,
        }
    }

    async fn ensure_contact(&self, user_id: &UserId, contact_id: Uuid) -> Result<(), Error> {
        self.contacts
            .find(user_id, contact_id)
            .await
            .map_err(|err| repository_fault("find parent contact", err))?
            .map(|_| ())
            .ok_or_else(|| Error::not_found("contact not found"))
    }

    async fn load(&self, contact_id: Uuid, id: Uuid) -> Result<Address, Error> {
        self.addresses
            .find(contact_id, id)
            .await
            .map_err(|err| repository_fault("find address", err))?
            .ok_or_else(|| Error::not_found("address not found"))
    }
}

#[async_trait]
impl AddressUsecase for AddressService {
    async fn create(
        &self,
        user_id: &UserId,
        contact_id: Uuid,
        draft: AddressDraft,
    ) -> Result<Address, Error> {
        draft.validate()?;
        self.ensure_contact(user_id, contact_id).await?;
        let address = Address::create(contact_id, draft, self.clock.utc());
        self.addresses
            .create(&address)
            .await
            .map_err(|err| repository_fault("insert address", err))?;

        publish(
            self.publisher.as_ref(),
            Topic::Addresses,
            address.id,
            EventKind::Created,
            address.created_at,
            &address,
        )
        .await?;
        Ok(address)
    }

    async fn get(&self, user_id: &UserId, contact_id: Uuid, id: Uuid) -> Result<Address, Error> {
        self.ensure_contact(user_id, contact_id).await?;
        self.load(contact_id, id).await
    }

    async fn list(
        &self,
        user_id: &UserId,
        contact_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Address>, Error> {
        self.ensure_contact(user_id, contact_id).await?;
        Ok(self
            .addresses
            .list(contact_id, page)
            .await
            .map_err(|err| repository_fault("list addresses", err))?)
    }

    async fn update(
        &self,
        user_id: &UserId,
        contact_id: Uuid,
        id: Uuid,
        draft: AddressDraft,
    ) -> Result<Address, Error> {
        draft.validate()?;
        self.ensure_contact(user_id, contact_id).await?;
        let mut address = self.load(contact_id, id).await?;
        address.apply(draft, self.clock.utc());

        let updated = self
            .addresses
            .update(&address)
            .await
            .map_err(|err| repository_fault("update address", err))?;
        if !updated {
            return Err(Error::not_found("address not found"));
        }

        publish(
            self.publisher.as_ref(),
            Topic::Addresses,
            address.id,
            EventKind::Updated,
            address.updated_at,
            &address,
        )
        .await?;
        Ok(address)
    }

    async fn delete(&self, user_id: &UserId, contact_id: Uuid, id: Uuid) -> Result<(), Error> {
        self.ensure_contact(user_id, contact_id).await?;
        let deleted = self
            .addresses
            .delete(contact_id, id)
            .await
            .map_err(|err| repository_fault("delete address", err))?;
        if !deleted {
            return Err(Error::not_found("address not found"));
        }

        publish(
            self.publisher.as_ref(),
            Topic::Addresses,
            id,
            EventKind::Deleted,
            self.clock.utc(),
            &json!({ "id": id, "contact_id": contact_id }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAddressRepository, MockContactRepository, MockEventPublisher};
    use crate::domain::test_fixtures::{expect_event, fixture_clock, fixture_timestamp, no_events, owner};
    use crate::domain::{Contact, ContactDraft, ErrorCode};
    use rstest::rstest;

    fn owned_contact() -> Contact {
        Contact::create(
            owner(),
            ContactDraft {
                first_name: "Ada".to_owned(),
                ..ContactDraft::default()
            },
            fixture_timestamp(),
        )
    }

    fn draft(postal_code: &str) -> AddressDraft {
        AddressDraft {
            street: Some("1 Main St".to_owned()),
            city: Some("Springfield".to_owned()),
            province: None,
            country: "US".to_owned(),
            postal_code: Some(postal_code.to_owned()),
        }
    }

    fn contacts_with(found: Option<Contact>) -> MockContactRepository {
        let mut contacts = MockContactRepository::new();
        contacts
            .expect_find()
            .returning(move |_, _| Ok(found.clone()));
        contacts
    }

    fn service(
        addresses: MockAddressRepository,
        contacts: MockContactRepository,
        publisher: MockEventPublisher,
    ) -> AddressService {
        AddressService::new(
            Arc::new(addresses),
            Arc::new(contacts),
            Arc::new(publisher),
            fixture_clock(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn create_under_owned_contact() {
        let contact = owned_contact();
        let contact_id = contact.id;
        let mut addresses = MockAddressRepository::new();
        addresses
            .expect_create()
            .withf(move |address| address.contact_id == contact_id)
            .times(1)
            .returning(|_| Ok(()));

        let address = service(
            addresses,
            contacts_with(Some(contact)),
            expect_event(Topic::Addresses, EventKind::Created),
        )
        .create(&owner(), contact_id, draft("62701"))
        .await
        .expect("created");
        assert_eq!(address.created_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_long_postal_code() {
        let mut addresses = MockAddressRepository::new();
        addresses.expect_create().never();

        let error = service(addresses, contacts_with(Some(owned_contact())), no_events())
            .create(&owner(), Uuid::new_v4(), draft(&"1".repeat(40)))
            .await
            .expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn foreign_contact_hides_addresses() {
        let mut addresses = MockAddressRepository::new();
        addresses.expect_list().never();

        let error = service(addresses, contacts_with(None), no_events())
            .list(&owner(), Uuid::new_v4(), PageRequest::default())
            .await
            .expect_err("foreign contact");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "contact not found");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_address_is_not_found() {
        let mut addresses = MockAddressRepository::new();
        addresses.expect_find().returning(|_, _| Ok(None));

        let error = service(addresses, contacts_with(Some(owned_contact())), no_events())
            .get(&owner(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .expect_err("missing");
        assert_eq!(error.message(), "address not found");
    }
}
