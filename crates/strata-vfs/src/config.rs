//! Mount table configuration.
//!
//! A mount table is a TOML file listing the mounts to build a
//! [`FileSystem`] from:
//!
//! ```toml
//! [[mount]]
//! point = "/data"
//! source = "~/games/quake/id1"
//! priority = "normal"
//! read_only = true
//!
//! [[mount]]
//! point = "/scratch"
//! kind = "memory"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::backends::{DirectoryMount, MemoryMount};
use crate::error::VfsError;
use crate::filesystem::FileSystem;
use crate::mount::Mount;
use crate::types::MountPriority;

/// Errors from loading or applying a mount table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mount table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("directory mount at {0} has no source")]
    MissingSource(String),

    #[error("failed to mount {point}: {source}")]
    Mount {
        point: String,
        #[source]
        source: VfsError,
    },
}

/// Backend type of a configured mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MountKind {
    /// Host directory, see [`DirectoryMount`].
    #[default]
    Directory,
    /// Ephemeral in-memory tree, see [`MemoryMount`].
    Memory,
}

/// One `[[mount]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MountConfig {
    /// VFS mount point.
    pub point: String,
    #[serde(default)]
    pub kind: MountKind,
    /// Host directory for directory mounts. `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub priority: MountPriority,
    #[serde(default)]
    pub read_only: bool,
}

impl MountConfig {
    /// Directory mount entry.
    pub fn directory(point: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            point: point.into(),
            kind: MountKind::Directory,
            source: Some(source.into()),
            priority: MountPriority::default(),
            read_only: false,
        }
    }

    /// Memory mount entry.
    pub fn memory(point: impl Into<String>) -> Self {
        Self {
            point: point.into(),
            kind: MountKind::Memory,
            source: None,
            priority: MountPriority::default(),
            read_only: false,
        }
    }

    pub fn with_priority(mut self, priority: MountPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Construct the backend this entry describes.
    pub fn build_mount(&self) -> Result<Box<dyn Mount>, ConfigError> {
        let mount: Box<dyn Mount> = match self.kind {
            MountKind::Directory => {
                let source = self
                    .source
                    .as_ref()
                    .ok_or_else(|| ConfigError::MissingSource(self.point.clone()))?;
                let source = expand_tilde(source);
                let mut dir = DirectoryMount::new(source).map_err(|source| ConfigError::Mount {
                    point: self.point.clone(),
                    source,
                })?;
                dir.set_read_only(self.read_only);
                Box::new(dir)
            }
            MountKind::Memory => {
                let mut memory = MemoryMount::new();
                memory.set_read_only(self.read_only);
                Box::new(memory)
            }
        };
        Ok(mount)
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(s.as_ref()).as_ref())
}

/// A whole mount table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VfsConfig {
    #[serde(default, rename = "mount")]
    pub mounts: Vec<MountConfig>,
}

impl VfsConfig {
    /// Parse a mount table from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a mount table from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Default mount table location (`~/.config/strata/mounts.toml` on Linux).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("strata").join("mounts.toml"))
    }

    /// Build a [`FileSystem`] with every configured mount registered.
    pub fn build(&self) -> Result<FileSystem, ConfigError> {
        let mut fs = FileSystem::new();
        self.apply(&mut fs)?;
        Ok(fs)
    }

    /// Register every configured mount on an existing [`FileSystem`].
    pub fn apply(&self, fs: &mut FileSystem) -> Result<(), ConfigError> {
        for entry in &self.mounts {
            let mount = entry.build_mount()?;
            fs.mount_boxed(&entry.point, mount, entry.priority)
                .map_err(|source| ConfigError::Mount {
                    point: entry.point.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
