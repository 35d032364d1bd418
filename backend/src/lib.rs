//! contactbook backend library.
//!
//! The crate follows a hexagonal layout: `domain` holds entities, services and
//! ports, `inbound` adapts HTTP requests and broker consumers onto the driving
//! ports, and `outbound` implements the driven ports against PostgreSQL, the
//! filesystem and the message broker. `middleware` carries the request tracing
//! layer and the logging/telemetry decorators wrapped around every port.
//! `server` loads settings and wires the adapters into a running service.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
