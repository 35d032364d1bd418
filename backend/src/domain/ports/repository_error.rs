//! Error shared by every persistence port.

use super::define_port_error;

define_port_error! {
    /// Errors raised by repository adapters.
    pub enum RepositoryError {
        /// The backing store could not be reached.
        Connection => "repository connection failed: {message}",
        /// A query or mutation failed during execution.
        Query => "repository query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict => "repository conflict: {message}",
    }
}
