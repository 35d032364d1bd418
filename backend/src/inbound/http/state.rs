//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AddressUsecase, ContactUsecase, ImageUsecase, TodoUsecase, UserUsecase,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserUsecase>,
    pub contacts: Arc<dyn ContactUsecase>,
    pub addresses: Arc<dyn AddressUsecase>,
    pub todos: Arc<dyn TodoUsecase>,
    pub images: Arc<dyn ImageUsecase>,
}
