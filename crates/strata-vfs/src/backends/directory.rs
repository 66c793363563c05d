//! Host directory backend.
//!
//! Exposes a real directory tree. The root is canonicalized once at
//! construction; local paths are joined onto it and handed to the host.

use std::fs::{self, Metadata, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{VfsError, VfsResult};
use crate::mount::Mount;
use crate::stream::BoxedStream;
use crate::types::{OpenMode, StatFlags, VfsStat, WriteMode};

/// Mount backed by a host directory.
///
/// All operations are relative to `root`. For example, if `root` is
/// `/srv/game/data`, then `stat("maps/e1m1.map")` stats
/// `/srv/game/data/maps/e1m1.map`.
///
/// Local paths containing `..` segments are rejected. Symlinks inside the
/// root are followed by the host as usual.
#[derive(Debug, Clone)]
pub struct DirectoryMount {
    root: PathBuf,
    read_only: bool,
}

impl DirectoryMount {
    /// Create a writable mount rooted at `root`.
    ///
    /// Fails with `Io` if `root` does not resolve to a directory.
    pub fn new(root: impl Into<PathBuf>) -> VfsResult<Self> {
        let root: PathBuf = root.into();
        let canonical = dunce::canonicalize(&root).map_err(|source| VfsError::Io {
            path: root.display().to_string(),
            source,
        })?;
        if !canonical.is_dir() {
            return Err(VfsError::io(
                canonical.display().to_string(),
                "mount root is not a directory",
            ));
        }
        Ok(Self {
            root: canonical,
            read_only: false,
        })
    }

    /// Create a mount that refuses every write.
    pub fn new_read_only(root: impl Into<PathBuf>) -> VfsResult<Self> {
        let mut mount = Self::new(root)?;
        mount.read_only = true;
        Ok(mount)
    }

    /// Set whether this mount is read-only.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Get the canonical root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a local path onto the host.
    fn resolve(&self, local_path: &str) -> VfsResult<PathBuf> {
        let mut full = self.root.clone();
        for segment in local_path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(VfsError::invalid_path(format!(
                        "{local_path}: escapes mount root"
                    )));
                }
                s => full.push(s),
            }
        }
        Ok(full)
    }

    fn check_writable(&self, local_path: &str) -> VfsResult<()> {
        if self.read_only {
            Err(VfsError::permission_denied(format!(
                "{local_path}: mount is read-only"
            )))
        } else {
            Ok(())
        }
    }

    fn metadata_to_stat(&self, path: &Path, meta: &Metadata) -> VfsStat {
        let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let stat = if meta.is_dir() {
            VfsStat::directory(mtime)
        } else if meta.is_file() {
            VfsStat::file(meta.len(), mtime)
        } else {
            VfsStat {
                mount: None,
                flags: StatFlags::empty(),
                size: meta.len(),
                mtime,
            }
        };
        let (readable, writable) = host_access(path, meta);
        stat.with_access(readable, writable && !self.read_only)
    }
}

#[cfg(unix)]
fn host_access(path: &Path, _meta: &Metadata) -> (bool, bool) {
    use rustix::fs::{Access, access};

    (
        access(path, Access::READ_OK).is_ok(),
        access(path, Access::WRITE_OK).is_ok(),
    )
}

#[cfg(not(unix))]
fn host_access(_path: &Path, meta: &Metadata) -> (bool, bool) {
    (true, !meta.permissions().readonly())
}

impl Mount for DirectoryMount {
    fn listdir(&self, local_path: &str) -> VfsResult<Vec<String>> {
        let full_path = self.resolve(local_path)?;
        let host_err = |e| VfsError::from_io(full_path.display().to_string(), e);

        let mut names = Vec::new();
        for entry in fs::read_dir(&full_path).map_err(host_err)? {
            let entry = entry.map_err(host_err)?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }

    fn open(
        &self,
        local_path: &str,
        open_mode: OpenMode,
        write_mode: WriteMode,
    ) -> VfsResult<BoxedStream> {
        if open_mode.writes() {
            self.check_writable(local_path)?;
        }
        let full_path = self.resolve(local_path)?;
        let host_path = full_path.display().to_string();

        if full_path.is_dir() {
            return Err(VfsError::io(host_path, "is a directory"));
        }

        let mut options = OpenOptions::new();
        match (open_mode, write_mode) {
            (OpenMode::Read, _) => options.read(true),
            (OpenMode::Write, WriteMode::Append) => options.append(true).create(true),
            (OpenMode::Both, WriteMode::Append) => {
                options.read(true).append(true).create(true)
            }
            (OpenMode::Write, _) => options.write(true).create(true).truncate(true),
            (OpenMode::Both, _) => options.read(true).write(true).create(true).truncate(true),
        };

        tracing::debug!(path = %host_path, ?open_mode, ?write_mode, "opening host file");
        let file = options
            .open(&full_path)
            .map_err(|e| VfsError::from_io(host_path, e))?;
        Ok(Box::new(file))
    }

    fn stat(&self, local_path: &str) -> VfsResult<VfsStat> {
        let full_path = self.resolve(local_path)?;
        let meta = fs::metadata(&full_path)
            .map_err(|e| VfsError::from_io(full_path.display().to_string(), e))?;
        Ok(self.metadata_to_stat(&full_path, &meta))
    }

    fn real_path(&self, local_path: &str) -> Option<PathBuf> {
        self.resolve(local_path).ok()
    }

    fn read_only(&self) -> bool {
        self.read_only
    }
}
