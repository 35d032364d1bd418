//! Domain primitives, aggregates and services.
//!
//! Purpose: define the entities the API manipulates (users, contacts,
//! addresses, todos, images), the ports through which they are persisted and
//! announced, and the services implementing the driving use cases. Nothing in
//! this module knows about HTTP, SQL or the broker wire format.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Fault / ResultExt: context chain with optional classification.
//! - Entity types and their drafts, plus the event envelope.
//! - `*Service` types implementing the use-case ports.

pub mod address;
pub mod address_service;
pub mod auth;
pub mod contact;
pub mod contact_service;
pub mod error;
pub mod events;
pub mod fault;
pub mod image;
pub mod image_service;
pub mod ports;
mod service_support;
#[cfg(test)]
mod test_fixtures;
pub mod todo;
pub mod todo_service;
pub mod trace_id;
pub mod user;
pub mod user_service;
pub mod validation;

pub use self::address::{Address, AddressDraft};
pub use self::address_service::AddressService;
pub use self::auth::{
    LoginCredentials, ProfileUpdate, Registration, SessionToken, token_fingerprint,
};
pub use self::contact::{Contact, ContactDraft, ContactSearch};
pub use self::contact_service::ContactService;
pub use self::error::{Error, ErrorCode};
pub use self::events::{EventEnvelope, EventKind, Topic};
pub use self::fault::{Classification, Fault, ResultExt, classification_of};
pub use self::image::{Comment, CommentDraft, Image, ImageUpload, Like};
pub use self::image_service::ImageService;
pub use self::todo::{Todo, TodoDraft, TodoSearch};
pub use self::todo_service::TodoService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{User, UserId, UserValidationError};
pub use self::user_service::UserService;
pub use self::validation::Validator;
