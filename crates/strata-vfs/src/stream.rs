//! Byte streams handed out by [`Mount::open`](crate::Mount::open).

use std::fmt::Debug;
use std::io::{Read, Seek, Write};

/// A readable, writable, seekable byte stream.
///
/// Whether reads or writes actually succeed depends on the mode the stream
/// was opened with; the backend returns an error for the other direction.
/// The caller owns the stream outright. Nothing in the VFS tracks it, so
/// dropping a mount while its streams are alive is allowed.
pub trait VfsStream: Read + Write + Seek + Send + Debug {}

impl<T: Read + Write + Seek + Send + Debug> VfsStream for T {}

/// Owned stream as returned by mounts and the router.
pub type BoxedStream = Box<dyn VfsStream>;
