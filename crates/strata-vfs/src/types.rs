//! Core VFS types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;
use strum::EnumString;

/// Resolution tier of a mount.
///
/// Higher tiers are consulted first, regardless of mount point length.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum MountPriority {
    /// Only consulted when nothing else answers.
    PracticallyInexistent,
    Discriminated,
    Inferior,
    #[default]
    Normal,
    Preferred,
    Superior,
    /// Shadows every other tier.
    Penetrant,
}

impl MountPriority {
    /// All tiers, lowest first.
    pub const ALL: [MountPriority; 7] = [
        MountPriority::PracticallyInexistent,
        MountPriority::Discriminated,
        MountPriority::Inferior,
        MountPriority::Normal,
        MountPriority::Preferred,
        MountPriority::Superior,
        MountPriority::Penetrant,
    ];

    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MountPriority::PracticallyInexistent => "practically_inexistent",
            MountPriority::Discriminated => "discriminated",
            MountPriority::Inferior => "inferior",
            MountPriority::Normal => "normal",
            MountPriority::Preferred => "preferred",
            MountPriority::Superior => "superior",
            MountPriority::Penetrant => "penetrant",
        }
    }
}

impl fmt::Display for MountPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Access requested when opening a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum OpenMode {
    #[default]
    Read,
    Write,
    #[strum(serialize = "both", serialize = "rw")]
    Both,
}

impl OpenMode {
    /// True for `Write` and `Both`.
    pub fn writes(&self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::Both)
    }

    /// True for `Read` and `Both`.
    pub fn reads(&self) -> bool {
        matches!(self, OpenMode::Read | OpenMode::Both)
    }
}

/// What happens to existing content when opening for writing.
///
/// `Ignore` behaves like `Overwrite`; it exists so callers that only read
/// have something to pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum WriteMode {
    #[default]
    Ignore,
    #[strum(serialize = "overwrite", serialize = "truncate")]
    Overwrite,
    Append,
}

/// Sharing request. Accepted for compatibility; only `DontCare` is honoured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum ShareMode {
    #[default]
    DontCare,
    Exclusive,
    ReadOnly,
}

bitflags::bitflags! {
    /// Type and access bits of a [`VfsStat`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatFlags: u32 {
        const UNUSED = 1 << 0;
        const WRITABLE = 1 << 1;
        const READABLE = 1 << 2;
        const DIRECTORY = 1 << 3;
        const REGULAR = 1 << 4;
    }
}

/// Identifies a mount registered with a [`FileSystem`](crate::FileSystem).
///
/// Ids are never reused within one `FileSystem`, so a stale id simply
/// stops resolving after an unmount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MountId(pub(crate) u64);

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mount#{}", self.0)
    }
}

/// Result of a stat query. Built fresh per call, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsStat {
    /// Mount that answered. Backends leave this `None`; the router fills it.
    pub mount: Option<MountId>,
    pub flags: StatFlags,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub mtime: SystemTime,
}

impl VfsStat {
    /// Stat for a regular file.
    pub fn file(size: u64, mtime: SystemTime) -> Self {
        Self {
            mount: None,
            flags: StatFlags::REGULAR,
            size,
            mtime,
        }
    }

    /// Stat for a directory.
    pub fn directory(mtime: SystemTime) -> Self {
        Self {
            mount: None,
            flags: StatFlags::DIRECTORY,
            size: 0,
            mtime,
        }
    }

    /// Add access bits.
    pub fn with_access(mut self, readable: bool, writable: bool) -> Self {
        self.flags.set(StatFlags::READABLE, readable);
        self.flags.set(StatFlags::WRITABLE, writable);
        self
    }

    pub fn is_dir(&self) -> bool {
        self.flags.contains(StatFlags::DIRECTORY)
    }

    pub fn is_file(&self) -> bool {
        self.flags.contains(StatFlags::REGULAR)
    }

    pub fn is_readable(&self) -> bool {
        self.flags.contains(StatFlags::READABLE)
    }

    pub fn is_writable(&self) -> bool {
        self.flags.contains(StatFlags::WRITABLE)
    }
}

/// Information about a registered mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    pub id: MountId,
    /// The mount point (e.g., "/data").
    pub mount_point: String,
    pub priority: MountPriority,
    /// Whether the backend refuses writes.
    pub read_only: bool,
}
