//! Backend contract.
//!
//! A [`Mount`] is one storage provider bound into the VFS namespace. The
//! [`FileSystem`](crate::FileSystem) strips the mount point before calling
//! in, so every path a backend sees is *local*: relative to its own root,
//! no leading slash, `""` for the root itself.

use std::fmt::Debug;
use std::path::PathBuf;

use crate::error::VfsResult;
use crate::stream::BoxedStream;
use crate::types::{OpenMode, VfsStat, WriteMode};

/// Storage backend mounted into a [`FileSystem`](crate::FileSystem).
///
/// Errors must use the VFS taxonomy: `NotFound` and `PermissionDenied` let
/// the router fall through to the next candidate mount, anything else is
/// reported as `Io`.
pub trait Mount: Send + Sync + Debug {
    /// Names of the entries directly inside `local_path`.
    fn listdir(&self, local_path: &str) -> VfsResult<Vec<String>>;

    /// Open a stream on `local_path`.
    ///
    /// A read-only backend must refuse every mode but `OpenMode::Read`
    /// with `PermissionDenied`.
    fn open(&self, local_path: &str, open_mode: OpenMode, write_mode: WriteMode)
    -> VfsResult<BoxedStream>;

    /// Size, mtime, type and access bits of `local_path`.
    ///
    /// Leave `VfsStat::mount` as `None`; the router stamps it.
    fn stat(&self, local_path: &str) -> VfsResult<VfsStat>;

    /// Host path backing `local_path`, for backends that have one.
    ///
    /// Virtual backends (memory, archives) return `None`.
    fn real_path(&self, local_path: &str) -> Option<PathBuf> {
        let _ = local_path;
        None
    }

    /// Returns true if this backend refuses all writes.
    fn read_only(&self) -> bool {
        false
    }
}
