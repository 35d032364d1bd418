//! Postal addresses attached to a contact.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Error, Validator};

/// Postal address. Ownership flows through the parent contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable address fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDraft {
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
}

impl AddressDraft {
    /// Check field lengths.
    pub fn validate(&self) -> Result<(), Error> {
        let mut validator = Validator::new();
        validator
            .optional("street", self.street.as_deref(), 255)
            .optional("city", self.city.as_deref(), 100)
            .optional("province", self.province.as_deref(), 100)
            .required("country", &self.country, 100)
            .optional("postal_code", self.postal_code.as_deref(), 10);
        validator.finish()
    }
}

impl Address {
    /// Materialise a new address under `contact_id`.
    pub fn create(contact_id: Uuid, draft: AddressDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact_id,
            street: draft.street,
            city: draft.city,
            province: draft.province,
            country: draft.country,
            postal_code: draft.postal_code,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the writable fields.
    pub fn apply(&mut self, draft: AddressDraft, now: DateTime<Utc>) {
        self.street = draft.street;
        self.city = draft.city;
        self.province = draft.province;
        self.country = draft.country;
        self.postal_code = draft.postal_code;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft(postal_code: &str) -> AddressDraft {
        AddressDraft {
            street: Some("12 Analytical Row".to_owned()),
            city: Some("London".to_owned()),
            province: None,
            country: "United Kingdom".to_owned(),
            postal_code: Some(postal_code.to_owned()),
        }
    }

    #[rstest]
    fn accepts_ten_character_postal_code() {
        assert!(draft("0123456789").validate().is_ok());
    }

    #[rstest]
    fn rejects_long_postal_code() {
        let error = draft(&"9".repeat(40)).validate().expect_err("too long");
        assert_eq!(error.details(), ["postal_code: must be at most 10 characters"]);
    }

    #[rstest]
    fn country_is_required() {
        let mut input = draft("N1 9GU");
        input.country = " ".to_owned();
        let error = input.validate().expect_err("missing country");
        assert_eq!(error.details(), ["country: must not be empty"]);
    }
}
