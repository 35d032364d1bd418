//! Contacts owned by a user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Error, UserId, Validator};

/// Address-book entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: Uuid,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable contact fields, used for both create and full update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactDraft {
    /// Check field lengths and email shape.
    pub fn validate(&self) -> Result<(), Error> {
        let mut validator = Validator::new();
        validator
            .required("first_name", &self.first_name, 100)
            .optional("last_name", self.last_name.as_deref(), 100)
            .email("email", self.email.as_deref(), 200)
            .optional("phone", self.phone.as_deref(), 20);
        validator.finish()
    }
}

impl Contact {
    /// Materialise a new contact from a validated draft.
    pub fn create(user_id: UserId, draft: ContactDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the writable fields.
    pub fn apply(&mut self, draft: ContactDraft, now: DateTime<Utc>) {
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.email = draft.email;
        self.phone = draft.phone;
        self.updated_at = now;
    }
}

/// Optional filters for contact search.
///
/// `name` matches first or last name, all filters are case-insensitive
/// substring matches, and absent filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSearch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactSearch {
    /// In-process form of the filter, shared by non-SQL adapters.
    pub fn matches(&self, contact: &Contact) -> bool {
        let name_ok = self.name.as_deref().is_none_or(|needle| {
            contains_ci(&contact.first_name, needle)
                || contact
                    .last_name
                    .as_deref()
                    .is_some_and(|last| contains_ci(last, needle))
        });
        let email_ok = self.email.as_deref().is_none_or(|needle| {
            contact
                .email
                .as_deref()
                .is_some_and(|email| contains_ci(email, needle))
        });
        let phone_ok = self.phone.as_deref().is_none_or(|needle| {
            contact
                .phone
                .as_deref()
                .is_some_and(|phone| contains_ci(phone, needle))
        });
        name_ok && email_ok && phone_ok
    }
}

pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> ContactDraft {
        ContactDraft {
            first_name: "Ada".to_owned(),
            last_name: Some("Lovelace".to_owned()),
            email: Some("ada@example.com".to_owned()),
            phone: Some("+44 20 7946 0000".to_owned()),
        }
    }

    #[rstest]
    fn valid_draft_passes(draft: ContactDraft) {
        assert!(draft.validate().is_ok());
    }

    #[rstest]
    fn invalid_draft_lists_every_violation(mut draft: ContactDraft) {
        draft.first_name = String::new();
        draft.email = Some("nope".to_owned());
        draft.phone = Some("0".repeat(21));
        let error = draft.validate().expect_err("invalid");
        assert_eq!(
            error.details(),
            [
                "first_name: must not be empty",
                "email: must be a valid email address",
                "phone: must be at most 20 characters",
            ]
        );
    }

    #[rstest]
    #[case(ContactSearch::default(), true)]
    #[case(ContactSearch { name: Some("love".into()), ..Default::default() }, true)]
    #[case(ContactSearch { name: Some("ADA".into()), ..Default::default() }, true)]
    #[case(ContactSearch { email: Some("example".into()), ..Default::default() }, true)]
    #[case(ContactSearch { phone: Some("999".into()), ..Default::default() }, false)]
    #[case(ContactSearch { name: Some("grace".into()), ..Default::default() }, false)]
    fn search_filters(draft: ContactDraft, #[case] search: ContactSearch, #[case] expected: bool) {
        let contact = Contact::create(UserId::random(), draft, Utc::now());
        assert_eq!(search.matches(&contact), expected);
    }

    #[rstest]
    fn apply_replaces_fields_and_bumps_timestamp(draft: ContactDraft) {
        let created = Utc::now();
        let mut contact = Contact::create(UserId::random(), draft, created);
        let later = created + chrono::Duration::seconds(5);
        contact.apply(
            ContactDraft {
                first_name: "Grace".to_owned(),
                ..ContactDraft::default()
            },
            later,
        );
        assert_eq!(contact.first_name, "Grace");
        assert!(contact.email.is_none());
        assert_eq!(contact.created_at, created);
        assert_eq!(contact.updated_at, later);
    }
}
