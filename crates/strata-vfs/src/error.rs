//! VFS error types.

use std::io;
use thiserror::Error;

/// VFS error type.
///
/// Backends map host errors into the first three variants at the mount
/// boundary; `InvalidPath` is raised by path validation before any mount
/// is consulted.
#[derive(Debug, Error)]
pub enum VfsError {
    /// No mount claims the path, or the backend has no such entry.
    #[error("not found: {0}")]
    NotFound(String),

    /// The mount refuses access (read-only policy or host permissions).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any other host-level I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Malformed or non-canonical VFS path or mount point.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// The four error kinds, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VfsErrorKind {
    NotFound,
    PermissionDenied,
    Io,
    InvalidPath,
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied(path.into())
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Create an Io error that is not backed by a host error code.
    pub fn io(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            source: io::Error::other(msg.into()),
        }
    }

    /// Map a host error into the VFS taxonomy.
    pub fn from_io(path: impl Into<String>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source: err },
        }
    }

    pub fn kind(&self) -> VfsErrorKind {
        match self {
            VfsError::NotFound(_) => VfsErrorKind::NotFound,
            VfsError::PermissionDenied(_) => VfsErrorKind::PermissionDenied,
            VfsError::Io { .. } => VfsErrorKind::Io,
            VfsError::InvalidPath(_) => VfsErrorKind::InvalidPath,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, VfsError::PermissionDenied(_))
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::PermissionDenied(msg) => {
                io::Error::new(io::ErrorKind::PermissionDenied, msg)
            }
            VfsError::Io { source, .. } => source,
            VfsError::InvalidPath(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_mapping() {
        let err = VfsError::from_io("a", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.kind(), VfsErrorKind::NotFound);

        let err = VfsError::from_io("a", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(err.is_permission_denied());

        let err = VfsError::from_io("a", io::Error::from(io::ErrorKind::InvalidData));
        assert_eq!(err.kind(), VfsErrorKind::Io);
    }

    #[test]
    fn test_into_io_error() {
        let err: io::Error = VfsError::invalid_path("/..").into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err: io::Error = VfsError::permission_denied("/x").into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_display() {
        let err = VfsError::io("/data/x", "disk on fire");
        assert_eq!(err.to_string(), "I/O error on /data/x: disk on fire");
    }
}
