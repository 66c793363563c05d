//! Mount backends.
//!
//! Backends implement [`Mount`](crate::Mount) for different storage types.

mod directory;
mod memory;

pub use directory::DirectoryMount;
pub use memory::MemoryMount;
