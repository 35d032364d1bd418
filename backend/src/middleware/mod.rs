//! Cross-cutting wrappers.
//!
//! Purpose: the HTTP [`Trace`] middleware plus the logging and telemetry
//! decorators placed around every port. Decorators observe and never alter
//! the wrapped result; composition order is chosen at startup by calling the
//! `decorate_*` helpers.

pub mod decorate;
pub mod logging;
pub mod telemetry;
pub mod trace;

pub use decorate::*;
pub use logging::Logged;
pub use telemetry::Traced;
pub use trace::Trace;
