//! # strata-vfs
//!
//! Priority-tiered virtual filesystem.
//!
//! A [`FileSystem`] unifies several storage backends behind one absolute,
//! forward-slash namespace. Key components:
//!
//! - [`Mount`] - Backend contract (listdir / open / stat)
//! - [`FileSystem`] - Routes VFS paths to mounts, falls back across them
//! - [`DirectoryMount`] - Host directory access
//! - [`MemoryMount`] - In-memory tree (for scratch space, testing)
//! - [`path`] - Pure helpers for canonical VFS paths
//! - [`VfsConfig`] - TOML mount tables
//!
//! ## Resolution
//!
//! ```text
//! Penetrant   /           (mod overrides)
//! Normal      /data       DirectoryMount(~/game/data, ro)
//!             /           DirectoryMount(~/game)
//! Inferior    /data       MemoryMount    (defaults)
//! ```
//!
//! Tiers are walked from highest priority down; inside a tier the most
//! specific mount point goes first. The first mount whose operation
//! succeeds answers. If none does, `PermissionDenied` wins over
//! `NotFound`.
//!
//! ```
//! use std::io::Read;
//! use strata_vfs::{FileSystem, MemoryMount, MountPriority, OpenMode, WriteMode};
//!
//! let defaults = MemoryMount::new();
//! defaults.insert_file("config.cfg", "volume=3").unwrap();
//!
//! let mut fs = FileSystem::new();
//! fs.mount("/etc", MemoryMount::new(), MountPriority::Preferred).unwrap();
//! fs.mount("/etc", defaults, MountPriority::Inferior).unwrap();
//!
//! let mut text = String::new();
//! fs.open("/etc/config.cfg", OpenMode::Read, WriteMode::Ignore)
//!     .unwrap()
//!     .read_to_string(&mut text)
//!     .unwrap();
//! assert_eq!(text, "volume=3");
//! ```

pub mod backends;
pub mod config;
mod error;
mod filesystem;
mod mount;
pub mod path;
mod stream;
mod types;

pub use backends::{DirectoryMount, MemoryMount};
pub use config::{ConfigError, MountConfig, MountKind, VfsConfig};
pub use error::{VfsError, VfsErrorKind, VfsResult};
pub use filesystem::FileSystem;
pub use mount::Mount;
pub use stream::{BoxedStream, VfsStream};
pub use types::{
    MountId, MountInfo, MountPriority, OpenMode, ShareMode, StatFlags, VfsStat, WriteMode,
};
