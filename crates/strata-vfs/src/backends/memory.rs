//! In-memory backend.
//!
//! Used for scratch mounts and testing. All data is ephemeral.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::{VfsError, VfsResult};
use crate::mount::Mount;
use crate::stream::BoxedStream;
use crate::types::{OpenMode, VfsStat, WriteMode};

#[derive(Debug)]
struct FileData {
    bytes: Vec<u8>,
    mtime: SystemTime,
}

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File(Arc<Mutex<FileData>>),
    Directory { mtime: SystemTime },
}

/// In-memory mount.
///
/// Entries are keyed by local path (`""` is the root directory). Streams
/// share the file's buffer, so bytes written through one stream are
/// visible to every later open.
#[derive(Debug)]
pub struct MemoryMount {
    entries: RwLock<HashMap<String, Entry>>,
    read_only: bool,
}

impl Default for MemoryMount {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMount {
    /// Create a new empty in-memory mount.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Root directory always exists
        entries.insert(
            String::new(),
            Entry::Directory {
                mtime: SystemTime::now(),
            },
        );
        Self {
            entries: RwLock::new(entries),
            read_only: false,
        }
    }

    /// Set whether VFS opens may write. Population through
    /// [`insert_file`](Self::insert_file) is always allowed.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Canonical key for a local path: no leading slash, no `.` segments.
    fn normalize(local_path: &str) -> VfsResult<String> {
        let mut segments = Vec::new();
        for segment in local_path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(VfsError::invalid_path(format!(
                        "{local_path}: escapes mount root"
                    )));
                }
                s => segments.push(s),
            }
        }
        Ok(segments.join("/"))
    }

    fn parent_key(key: &str) -> &str {
        key.rsplit_once('/').map_or("", |(parent, _)| parent)
    }

    /// Create `key` and all missing ancestors as directories.
    fn ensure_dirs(entries: &mut HashMap<String, Entry>, key: &str) -> VfsResult<()> {
        if key.is_empty() {
            return Ok(());
        }
        let mut current = String::new();
        for segment in key.split('/') {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            match entries.get(&current) {
                Some(Entry::Directory { .. }) => {}
                Some(Entry::File(_)) => {
                    return Err(VfsError::io(current, "not a directory"));
                }
                None => {
                    entries.insert(
                        current.clone(),
                        Entry::Directory {
                            mtime: SystemTime::now(),
                        },
                    );
                }
            }
        }
        Ok(())
    }

    /// Create a directory, including missing parents.
    pub fn create_dir(&self, path: &str) -> VfsResult<()> {
        let key = Self::normalize(path)?;
        let mut entries = self.entries.write();
        Self::ensure_dirs(&mut entries, &key)
    }

    /// Create or replace a file, including missing parent directories.
    pub fn insert_file(&self, path: &str, data: impl Into<Vec<u8>>) -> VfsResult<()> {
        let key = Self::normalize(path)?;
        let mut entries = self.entries.write();
        if let Some(Entry::Directory { .. }) = entries.get(&key) {
            return Err(VfsError::io(key, "is a directory"));
        }
        Self::ensure_dirs(&mut entries, Self::parent_key(&key))?;
        entries.insert(
            key,
            Entry::File(Arc::new(Mutex::new(FileData {
                bytes: data.into(),
                mtime: SystemTime::now(),
            }))),
        );
        Ok(())
    }
}

impl Mount for MemoryMount {
    fn listdir(&self, local_path: &str) -> VfsResult<Vec<String>> {
        let key = Self::normalize(local_path)?;
        let entries = self.entries.read();

        match entries.get(&key) {
            Some(Entry::Directory { .. }) => {}
            Some(Entry::File(_)) => return Err(VfsError::io(key, "not a directory")),
            None => return Err(VfsError::not_found(key)),
        }

        let mut names: Vec<String> = entries
            .keys()
            .filter(|k| !k.is_empty() && Self::parent_key(k) == key)
            .map(|k| k.rsplit('/').next().unwrap_or(k.as_str()).to_string())
            .collect();

        // Sort for consistent ordering
        names.sort();
        Ok(names)
    }

    fn open(
        &self,
        local_path: &str,
        open_mode: OpenMode,
        write_mode: WriteMode,
    ) -> VfsResult<BoxedStream> {
        if open_mode.writes() && self.read_only {
            return Err(VfsError::permission_denied(format!(
                "{local_path}: mount is read-only"
            )));
        }
        let key = Self::normalize(local_path)?;

        let existing = self.entries.read().get(&key).cloned();
        let data = match existing {
            Some(Entry::Directory { .. }) => return Err(VfsError::io(key, "is a directory")),
            Some(Entry::File(data)) => {
                if open_mode.writes() && write_mode != WriteMode::Append {
                    let mut file = data.lock();
                    file.bytes.clear();
                    file.mtime = SystemTime::now();
                }
                data
            }
            None if !open_mode.writes() => return Err(VfsError::not_found(key)),
            None => {
                let mut entries = self.entries.write();
                match entries.get(Self::parent_key(&key)) {
                    Some(Entry::Directory { .. }) => {}
                    Some(Entry::File(_)) => {
                        return Err(VfsError::io(key, "parent is not a directory"));
                    }
                    None => return Err(VfsError::not_found(key)),
                }
                let data = Arc::new(Mutex::new(FileData {
                    bytes: Vec::new(),
                    mtime: SystemTime::now(),
                }));
                entries.insert(key, Entry::File(Arc::clone(&data)));
                data
            }
        };

        Ok(Box::new(MemoryStream {
            data,
            pos: 0,
            readable: open_mode.reads(),
            writable: open_mode.writes(),
            append: write_mode == WriteMode::Append,
        }))
    }

    fn stat(&self, local_path: &str) -> VfsResult<VfsStat> {
        let key = Self::normalize(local_path)?;
        let entries = self.entries.read();
        let stat = match entries.get(&key) {
            Some(Entry::File(data)) => {
                let file = data.lock();
                VfsStat::file(file.bytes.len() as u64, file.mtime)
            }
            Some(Entry::Directory { mtime }) => VfsStat::directory(*mtime),
            None => return Err(VfsError::not_found(key)),
        };
        Ok(stat.with_access(true, !self.read_only))
    }

    fn read_only(&self) -> bool {
        self.read_only
    }
}

/// Stream over a shared in-memory file buffer.
#[derive(Debug)]
struct MemoryStream {
    data: Arc<Mutex<FileData>>,
    pos: u64,
    readable: bool,
    writable: bool,
    append: bool,
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.readable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "stream not opened for reading",
            ));
        }
        let file = self.data.lock();
        let start = usize::try_from(self.pos)
            .unwrap_or(usize::MAX)
            .min(file.bytes.len());
        let n = buf.len().min(file.bytes.len() - start);
        buf[..n].copy_from_slice(&file.bytes[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "stream not opened for writing",
            ));
        }
        let mut file = self.data.lock();
        if self.append {
            self.pos = file.bytes.len() as u64;
        }
        let end = usize::try_from(self.pos)
            .ok()
            .and_then(|start| start.checked_add(buf.len()))
            .ok_or_else(|| invalid_input("write past the end of addressable memory"))?;
        let start = end - buf.len();
        if end > file.bytes.len() {
            file.bytes.resize(end, 0);
        }
        file.bytes[start..end].copy_from_slice(buf);
        file.mtime = SystemTime::now();
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn invalid_input(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, delta) = match pos {
            SeekFrom::Start(offset) => {
                self.pos = offset;
                return Ok(offset);
            }
            SeekFrom::End(delta) => (self.data.lock().bytes.len() as u64, delta),
            SeekFrom::Current(delta) => (self.pos, delta),
        };
        let target = base
            .checked_add_signed(delta)
            .ok_or_else(|| invalid_input("seek out of range"))?;
        self.pos = target;
        Ok(target)
    }
}
