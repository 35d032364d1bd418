//! Image content stores.
//!
//! [`FsImageStore`] keeps bytes in a capability-scoped directory;
//! [`InMemoryImageStore`] backs tests and throwaway runs.

mod fs;
mod memory;

pub use fs::FsImageStore;
pub use memory::InMemoryImageStore;
