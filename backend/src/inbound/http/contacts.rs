//! Contact handlers.
//!
//! ```text
//! POST   /api/v1/contacts                {"first_name":"Grace","email":"grace@example.com"}
//! GET    /api/v1/contacts?name=gr&page=1&size=10
//! GET    /api/v1/contacts/{id}
//! PUT    /api/v1/contacts/{id}
//! DELETE /api/v1/contacts/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{Contact, ContactDraft, ContactSearch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{
    ContactEnvelope, ContactPageEnvelope, EmptyEnvelope, ErrorEnvelope,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// Contact create/replace body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ContactRequest {
    #[schema(example = "Grace")]
    pub first_name: String,
    #[schema(example = "Hopper")]
    pub last_name: Option<String>,
    #[schema(example = "grace@example.com")]
    pub email: Option<String>,
    #[schema(example = "+1 555 0100")]
    pub phone: Option<String>,
}

impl From<ContactRequest> for ContactDraft {
    fn from(value: ContactRequest) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
        }
    }
}

/// Contact as returned to its owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            phone: contact.phone,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        }
    }
}

/// Search filters plus page window. Text filters match case-insensitive
/// substrings; `name` checks first and last name.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactSearchQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ContactSearchQuery {
    fn split(self) -> (ContactSearch, PageQuery) {
        let filter = ContactSearch {
            name: self.name,
            email: self.email,
            phone: self.phone,
        };
        let page = PageQuery {
            page: self.page,
            size: self.size,
        };
        (filter, page)
    }
}

/// Create a contact.
#[utoipa::path(
    post,
    path = "/api/v1/contacts",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Contact created", body = ContactEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["contacts"],
    operation_id = "createContact"
)]
#[post("/contacts")]
pub async fn create_contact(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<ContactRequest>,
) -> ApiResult<HttpResponse> {
    let contact = state
        .contacts
        .create(user.id(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(Envelope::data(ContactResponse::from(contact))))
}

/// Search the caller's contacts.
#[utoipa::path(
    get,
    path = "/api/v1/contacts",
    params(ContactSearchQuery),
    responses(
        (status = 200, description = "Matching contacts", body = ContactPageEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["contacts"],
    operation_id = "searchContacts"
)]
#[get("/contacts")]
pub async fn search_contacts(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<ContactSearchQuery>,
) -> ApiResult<web::Json<Envelope<Vec<ContactResponse>>>> {
    let (filter, page) = query.into_inner().split();
    let page = PageRequest::try_from(page)?;
    let found = state.contacts.search(user.id(), filter, page).await?;
    Ok(web::Json(Envelope::page(found.map(ContactResponse::from))))
}

/// Fetch one contact.
#[utoipa::path(
    get,
    path = "/api/v1/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Contact", body = ContactEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["contacts"],
    operation_id = "getContact"
)]
#[get("/contacts/{id}")]
pub async fn get_contact(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Envelope<ContactResponse>>> {
    let contact = state.contacts.get(user.id(), path.into_inner()).await?;
    Ok(web::Json(Envelope::data(contact.into())))
}

/// Replace a contact's fields.
#[utoipa::path(
    put,
    path = "/api/v1/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact id")),
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Updated contact", body = ContactEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["contacts"],
    operation_id = "updateContact"
)]
#[put("/contacts/{id}")]
pub async fn update_contact(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<web::Json<Envelope<ContactResponse>>> {
    let contact = state
        .contacts
        .update(user.id(), path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(Envelope::data(contact.into())))
}

/// Delete a contact and its addresses.
#[utoipa::path(
    delete,
    path = "/api/v1/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Deleted", body = EmptyEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["contacts"],
    operation_id = "deleteContact"
)]
#[delete("/contacts/{id}")]
pub async fn delete_contact(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Envelope<()>>> {
    state.contacts.delete(user.id(), path.into_inner()).await?;
    Ok(web::Json(Envelope::empty()))
}
