//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint, the request/response DTOs and the
//! envelope wrappers from [`crate::inbound::http::schemas`]. The document is
//! served by Swagger UI in debug builds and exported by the `openapi-dump`
//! binary.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::addresses::{AddressRequest, AddressResponse};
use crate::inbound::http::contacts::{ContactRequest, ContactResponse};
use crate::inbound::http::images::{CommentRequest, CommentResponse, ImageResponse, LikeResponse};
use crate::inbound::http::schemas::{
    AddressEnvelope, AddressPageEnvelope, CommentEnvelope, CommentPageEnvelope, ContactEnvelope,
    ContactPageEnvelope, EmptyEnvelope, ErrorEnvelope, ImageEnvelope, ImagePageEnvelope,
    LikeEnvelope, PagingSchema, TodoEnvelope, TodoPageEnvelope, TokenEnvelope, UserEnvelope,
};
use crate::inbound::http::todos::{TodoRequest, TodoResponse};
use crate::inbound::http::users::{
    LoginRequest, RegisterRequest, TokenResponse, UpdateProfileRequest, UserResponse,
};

/// Name of the bearer security scheme.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Opaque token issued by POST /api/v1/users/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "contactbook API",
        description = "Users, contacts, addresses, todos and images behind bearer-token auth."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current,
        crate::inbound::http::users::update_current,
        crate::inbound::http::contacts::create_contact,
        crate::inbound::http::contacts::search_contacts,
        crate::inbound::http::contacts::get_contact,
        crate::inbound::http::contacts::update_contact,
        crate::inbound::http::contacts::delete_contact,
        crate::inbound::http::addresses::create_address,
        crate::inbound::http::addresses::list_addresses,
        crate::inbound::http::addresses::get_address,
        crate::inbound::http::addresses::update_address,
        crate::inbound::http::addresses::delete_address,
        crate::inbound::http::todos::create_todo,
        crate::inbound::http::todos::search_todos,
        crate::inbound::http::todos::get_todo,
        crate::inbound::http::todos::update_todo,
        crate::inbound::http::todos::delete_todo,
        crate::inbound::http::todos::complete_todo,
        crate::inbound::http::images::upload_image,
        crate::inbound::http::images::list_images,
        crate::inbound::http::images::get_image,
        crate::inbound::http::images::image_content,
        crate::inbound::http::images::delete_image,
        crate::inbound::http::images::like_image,
        crate::inbound::http::images::unlike_image,
        crate::inbound::http::images::comment_image,
        crate::inbound::http::images::list_comments,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegisterRequest, LoginRequest, UpdateProfileRequest, UserResponse, TokenResponse,
        ContactRequest, ContactResponse, AddressRequest, AddressResponse,
        TodoRequest, TodoResponse,
        ImageResponse, LikeResponse, CommentRequest, CommentResponse,
        PagingSchema, ErrorEnvelope, EmptyEnvelope,
        UserEnvelope, TokenEnvelope, ContactEnvelope, ContactPageEnvelope,
        AddressEnvelope, AddressPageEnvelope, TodoEnvelope, TodoPageEnvelope,
        ImageEnvelope, ImagePageEnvelope, LikeEnvelope, CommentEnvelope, CommentPageEnvelope,
    )),
    tags(
        (name = "users", description = "Registration, login and the current account"),
        (name = "contacts", description = "Contacts owned by the caller"),
        (name = "addresses", description = "Addresses of a contact"),
        (name = "todos", description = "Todo items owned by the caller"),
        (name = "images", description = "Image uploads, likes and comments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api/v1/users")]
    #[case("/api/v1/users/login")]
    #[case("/api/v1/contacts/{id}")]
    #[case("/api/v1/contacts/{contact_id}/addresses/{id}")]
    #[case("/api/v1/todos/{id}/complete")]
    #[case("/api/v1/images/{id}/content")]
    #[case("/api/v1/images/{id}/comments")]
    #[case("/health/ready")]
    fn document_lists_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
        assert!(components.schemas.contains_key("ErrorEnvelope"));
        assert!(components.schemas.contains_key("Paging"));
    }

    #[rstest]
    fn document_serialises_to_json() {
        let json = ApiDoc::openapi().to_json().expect("serialise OpenAPI");
        assert!(json.contains("\"contactbook API\""));
    }
}
