//! HTTP inbound adapter exposing the REST API under `/api/v1`.

use actix_web::web;

pub mod addresses;
pub mod auth;
pub mod contacts;
pub mod envelope;
pub mod error;
pub mod health;
pub mod images;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod todos;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every API route and the extractor configuration they share.
///
/// Expects [`state::HttpState`] to be registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(validation::json_config())
            .app_data(validation::query_config())
            .app_data(validation::path_config())
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(users::current)
            .service(users::update_current)
            .service(contacts::create_contact)
            .service(contacts::search_contacts)
            .service(contacts::get_contact)
            .service(contacts::update_contact)
            .service(contacts::delete_contact)
            .service(addresses::create_address)
            .service(addresses::list_addresses)
            .service(addresses::get_address)
            .service(addresses::update_address)
            .service(addresses::delete_address)
            .service(todos::create_todo)
            .service(todos::search_todos)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo)
            .service(todos::complete_todo)
            .service(images::upload_image)
            .service(images::list_images)
            .service(images::get_image)
            .service(images::image_content)
            .service(images::delete_image)
            .service(images::like_image)
            .service(images::unlike_image)
            .service(images::comment_image)
            .service(images::list_comments),
    );
}
