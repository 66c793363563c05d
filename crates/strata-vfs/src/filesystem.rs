//! Mount router with priority tiers.
//!
//! Routes filesystem operations to the mounts whose mount point covers the
//! requested path, trying candidates until one succeeds.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{VfsError, VfsResult};
use crate::mount::Mount;
use crate::path::{dirname, normalize_vfs_path, strip_mount_point, validate_vfs_path};
use crate::stream::BoxedStream;
use crate::types::{MountId, MountInfo, MountPriority, OpenMode, ShareMode, VfsStat, WriteMode};

/// A mount bound at a mount point.
#[derive(Debug)]
struct Binding {
    id: MountId,
    mount_point: String,
    mount: Box<dyn Mount>,
}

/// Routes VFS paths to mounted backends.
///
/// Candidates are visited tier by tier, highest [`MountPriority`] first.
/// Within a tier the longest (most specific) mount point comes first; mount
/// points of equal length keep registration order. A mount point covers a
/// path only on a segment boundary, so `/foo` never answers for `/foobar`.
///
/// The first candidate whose operation succeeds wins. `NotFound`,
/// `PermissionDenied` and I/O failures move on to the next candidate; if
/// all of them fail the call reports `PermissionDenied` when any candidate
/// refused access, `NotFound` otherwise.
///
/// There is no internal locking. Registration takes `&mut self`; share the
/// `FileSystem` across threads behind your own lock if you need to.
#[derive(Debug, Default)]
pub struct FileSystem {
    tiers: BTreeMap<MountPriority, Vec<Binding>>,
    next_id: u64,
}

impl FileSystem {
    /// Create a filesystem with no mounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a backend at `mount_point`.
    ///
    /// The mount point may carry one trailing slash; otherwise it must be
    /// canonical. Mounting twice at the same point is allowed, both stay
    /// candidates.
    pub fn mount(
        &mut self,
        mount_point: &str,
        mount: impl Mount + 'static,
        priority: MountPriority,
    ) -> VfsResult<MountId> {
        self.mount_boxed(mount_point, Box::new(mount), priority)
    }

    /// Mount a backend that is already boxed.
    pub fn mount_boxed(
        &mut self,
        mount_point: &str,
        mount: Box<dyn Mount>,
        priority: MountPriority,
    ) -> VfsResult<MountId> {
        let mount_point = normalize_vfs_path(mount_point);
        validate_vfs_path(mount_point)?;

        let id = MountId(self.next_id);
        self.next_id += 1;

        tracing::info!(
            %id,
            mount_point,
            %priority,
            read_only = mount.read_only(),
            "mounted"
        );

        let tier = self.tiers.entry(priority).or_default();
        tier.push(Binding {
            id,
            mount_point: mount_point.to_string(),
            mount,
        });
        // Stable: equal lengths keep registration order.
        tier.sort_by_key(|binding| Reverse(binding.mount_point.len()));

        Ok(id)
    }

    /// Remove a mount and hand the backend back.
    ///
    /// Streams already opened through it stay valid; they are owned by
    /// the caller.
    pub fn unmount(&mut self, id: MountId) -> Option<Box<dyn Mount>> {
        for tier in self.tiers.values_mut() {
            if let Some(pos) = tier.iter().position(|binding| binding.id == id) {
                let binding = tier.remove(pos);
                tracing::info!(%id, mount_point = %binding.mount_point, "unmounted");
                return Some(binding.mount);
            }
        }
        None
    }

    /// All mounts, in resolution order.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.bindings()
            .map(|(priority, binding)| Self::info(priority, binding))
            .collect()
    }

    /// Look up a single mount.
    pub fn mount_info(&self, id: MountId) -> Option<MountInfo> {
        self.bindings()
            .find(|(_, binding)| binding.id == id)
            .map(|(priority, binding)| Self::info(priority, binding))
    }

    fn info(priority: MountPriority, binding: &Binding) -> MountInfo {
        MountInfo {
            id: binding.id,
            mount_point: binding.mount_point.clone(),
            priority,
            read_only: binding.mount.read_only(),
        }
    }

    /// Bindings in resolution order.
    fn bindings(&self) -> impl Iterator<Item = (MountPriority, &Binding)> {
        self.tiers
            .iter()
            .rev()
            .flat_map(|(priority, tier)| tier.iter().map(move |binding| (*priority, binding)))
    }

    /// Visit every mount covering `path`, in resolution order.
    ///
    /// `handler` receives the mount and the local path (mount point
    /// stripped, no leading slash) and returns `true` to stop. `path` must
    /// already be canonical.
    pub fn iter_file_mounts<F>(&self, path: &str, mut handler: F)
    where
        F: FnMut(MountId, &dyn Mount, &str) -> bool,
    {
        for (_, binding) in self.bindings() {
            let Some(local) = strip_mount_point(&binding.mount_point, path) else {
                continue;
            };
            if handler(binding.id, binding.mount.as_ref(), local) {
                return;
            }
        }
    }

    /// Normalize and validate a lookup path.
    fn canonical(path: &str) -> VfsResult<&str> {
        let path = normalize_vfs_path(path);
        validate_vfs_path(path)?;
        Ok(path)
    }

    /// Try `op` against each candidate mount until one succeeds.
    fn resolve<T, F>(&self, op: &'static str, path: &str, mut attempt: F) -> VfsResult<(MountId, T)>
    where
        F: FnMut(&dyn Mount, &str) -> VfsResult<T>,
    {
        let path = Self::canonical(path)?;
        let mut denied = false;
        let mut hit = None;

        self.iter_file_mounts(path, |id, mount, local| match attempt(mount, local) {
            Ok(value) => {
                hit = Some((id, value));
                true
            }
            Err(err) => {
                tracing::debug!(op, path, %id, error = %err, "candidate mount failed");
                denied |= err.is_permission_denied();
                false
            }
        });

        match hit {
            Some(hit) => Ok(hit),
            None if denied => Err(VfsError::permission_denied(path)),
            None => Err(VfsError::not_found(path)),
        }
    }

    /// Open `path` on the first mount that yields a stream.
    pub fn open(
        &self,
        path: &str,
        open_mode: OpenMode,
        write_mode: WriteMode,
    ) -> VfsResult<BoxedStream> {
        let (_, stream) = self.resolve("open", path, |mount, local| {
            mount.open(local, open_mode, write_mode)
        })?;
        Ok(stream)
    }

    /// [`open`](Self::open) with a share mode.
    ///
    /// Share modes are not enforced; anything but `DontCare` is logged
    /// and otherwise ignored.
    pub fn open_with_share(
        &self,
        path: &str,
        open_mode: OpenMode,
        write_mode: WriteMode,
        share_mode: ShareMode,
    ) -> VfsResult<BoxedStream> {
        if share_mode != ShareMode::DontCare {
            tracing::warn!(path, ?share_mode, "share modes are not supported, ignoring");
        }
        self.open(path, open_mode, write_mode)
    }

    /// Stat `path` on the first mount that knows it.
    ///
    /// The result's `mount` field names the mount that answered.
    pub fn stat(&self, path: &str) -> VfsResult<VfsStat> {
        let (id, mut stat) = self.resolve("stat", path, |mount, local| mount.stat(local))?;
        stat.mount = Some(id);
        Ok(stat)
    }

    /// List `path` on the first mount that can.
    ///
    /// Entries are not merged across overlapping mounts.
    pub fn listdir(&self, path: &str) -> VfsResult<Vec<String>> {
        let (_, entries) = self.resolve("listdir", path, |mount, local| mount.listdir(local))?;
        Ok(entries)
    }

    /// Check if a path exists on any mount.
    pub fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }

    /// True iff `path` stats successfully with the readable bit set.
    pub fn file_readable(&self, path: &str) -> bool {
        self.stat(path).is_ok_and(|stat| stat.is_readable())
    }

    /// True iff `path` could be written.
    ///
    /// An existing path must carry the writable bit. A missing path is
    /// writable when its parent directory is, since a file could be
    /// created there. Any other failure means not writable.
    pub fn file_writable(&self, path: &str) -> bool {
        match self.stat(path) {
            Ok(stat) => stat.is_writable(),
            Err(VfsError::NotFound(_)) => {
                let path = normalize_vfs_path(path);
                let parent = dirname(path);
                if parent.is_empty() || parent == path {
                    return false;
                }
                self.stat(parent).is_ok_and(|stat| stat.is_writable())
            }
            Err(_) => false,
        }
    }

    /// Host path backing `path`, from the first mount where it exists and
    /// that maps onto the host.
    pub fn real_path(&self, path: &str) -> Option<PathBuf> {
        let path = Self::canonical(path).ok()?;
        let mut found = None;
        self.iter_file_mounts(path, |_, mount, local| {
            if mount.stat(local).is_err() {
                return false;
            }
            found = mount.real_path(local);
            found.is_some()
        });
        found
    }
}
