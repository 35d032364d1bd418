//! Address handlers, nested under the owning contact.
//!
//! ```text
//! POST   /api/v1/contacts/{contact_id}/addresses       {"country":"NL","city":"Delft"}
//! GET    /api/v1/contacts/{contact_id}/addresses?page=1
//! GET    /api/v1/contacts/{contact_id}/addresses/{id}
//! PUT    /api/v1/contacts/{contact_id}/addresses/{id}
//! DELETE /api/v1/contacts/{contact_id}/addresses/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Address, AddressDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{
    AddressEnvelope, AddressPageEnvelope, EmptyEnvelope, ErrorEnvelope,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// Address create/replace body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddressRequest {
    pub street: Option<String>,
    #[schema(example = "Delft")]
    pub city: Option<String>,
    pub province: Option<String>,
    #[schema(example = "NL")]
    pub country: String,
    #[schema(example = "2611")]
    pub postal_code: Option<String>,
}

impl From<AddressRequest> for AddressDraft {
    fn from(value: AddressRequest) -> Self {
        Self {
            street: value.street,
            city: value.city,
            province: value.province,
            country: value.country,
            postal_code: value.postal_code,
        }
    }
}

/// Address as returned to the contact's owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
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

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            contact_id: address.contact_id,
            street: address.street,
            city: address.city,
            province: address.province,
            country: address.country,
            postal_code: address.postal_code,
            created_at: address.created_at,
            updated_at: address.updated_at,
        }
    }
}

/// Add an address to a contact.
#[utoipa::path(
    post,
    path = "/api/v1/contacts/{contact_id}/addresses",
    params(("contact_id" = Uuid, Path, description = "Owning contact")),
    request_body = AddressRequest,
    responses(
        (status = 201, description = "Address created", body = AddressEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Contact not found", body = ErrorEnvelope)
    ),
    tags = ["addresses"],
    operation_id = "createAddress"
)]
#[post("/contacts/{contact_id}/addresses")]
pub async fn create_address(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    payload: web::Json<AddressRequest>,
) -> ApiResult<HttpResponse> {
    let address = state
        .addresses
        .create(user.id(), path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(Envelope::data(AddressResponse::from(address))))
}

/// List a contact's addresses.
#[utoipa::path(
    get,
    path = "/api/v1/contacts/{contact_id}/addresses",
    params(("contact_id" = Uuid, Path, description = "Owning contact"), PageQuery),
    responses(
        (status = 200, description = "Addresses", body = AddressPageEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Contact not found", body = ErrorEnvelope)
    ),
    tags = ["addresses"],
    operation_id = "listAddresses"
)]
#[get("/contacts/{contact_id}/addresses")]
pub async fn list_addresses(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Envelope<Vec<AddressResponse>>>> {
    let page = PageRequest::try_from(query.into_inner())?;
    let found = state
        .addresses
        .list(user.id(), path.into_inner(), page)
        .await?;
    Ok(web::Json(Envelope::page(found.map(AddressResponse::from))))
}

/// Fetch one address.
#[utoipa::path(
    get,
    path = "/api/v1/contacts/{contact_id}/addresses/{id}",
    params(
        ("contact_id" = Uuid, Path, description = "Owning contact"),
        ("id" = Uuid, Path, description = "Address id")
    ),
    responses(
        (status = 200, description = "Address", body = AddressEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["addresses"],
    operation_id = "getAddress"
)]
#[get("/contacts/{contact_id}/addresses/{id}")]
pub async fn get_address(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<web::Json<Envelope<AddressResponse>>> {
    let (contact_id, id) = path.into_inner();
    let address = state.addresses.get(user.id(), contact_id, id).await?;
    Ok(web::Json(Envelope::data(address.into())))
}

/// Replace an address's fields.
#[utoipa::path(
    put,
    path = "/api/v1/contacts/{contact_id}/addresses/{id}",
    params(
        ("contact_id" = Uuid, Path, description = "Owning contact"),
        ("id" = Uuid, Path, description = "Address id")
    ),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Updated address", body = AddressEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["addresses"],
    operation_id = "updateAddress"
)]
#[put("/contacts/{contact_id}/addresses/{id}")]
pub async fn update_address(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<AddressRequest>,
) -> ApiResult<web::Json<Envelope<AddressResponse>>> {
    let (contact_id, id) = path.into_inner();
    let address = state
        .addresses
        .update(user.id(), contact_id, id, payload.into_inner().into())
        .await?;
    Ok(web::Json(Envelope::data(address.into())))
}

/// Delete an address.
#[utoipa::path(
    delete,
    path = "/api/v1/contacts/{contact_id}/addresses/{id}",
    params(
        ("contact_id" = Uuid, Path, description = "Owning contact"),
        ("id" = Uuid, Path, description = "Address id")
    ),
    responses(
        (status = 200, description = "Deleted", body = EmptyEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope)
    ),
    tags = ["addresses"],
    operation_id = "deleteAddress"
)]
#[delete("/contacts/{contact_id}/addresses/{id}")]
pub async fn delete_address(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<web::Json<Envelope<()>>> {
    let (contact_id, id) = path.into_inner();
    state.addresses.delete(user.id(), contact_id, id).await?;
    Ok(web::Json(Envelope::empty()))
}
