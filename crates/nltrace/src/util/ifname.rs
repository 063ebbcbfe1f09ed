//! Interface index to name resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Error type for interface operations.
#[derive(Debug, thiserror::Error)]
pub enum IfError {
    #[error("interface not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IfError>;

/// Default sysfs directory listing network interfaces.
pub const SYSFS_NET: &str = "/sys/class/net";

/// Convert an interface index to name by scanning a sysfs-style directory.
pub fn index_to_name_in(root: &Path, index: u32) -> Result<String> {
    if index == 0 {
        return Err(IfError::NotFound("index 0".to_string()));
    }

    let entries = std::fs::read_dir(root)?;

    for entry in entries.flatten() {
        let path = entry.path().join("ifindex");
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(idx) = content.trim().parse::<u32>()
            && idx == index
        {
            return Ok(entry.file_name().to_string_lossy().to_string());
        }
    }

    Err(IfError::NotFound(format!("index {}", index)))
}

/// Convert an interface index to name.
pub fn index_to_name(index: u32) -> Result<String> {
    index_to_name_in(Path::new(SYSFS_NET), index)
}

/// Maps interface indices to names for rendering.
pub trait IfNameResolver {
    /// Name of the interface with this index, if known.
    fn name(&self, index: u32) -> Option<String>;
}

/// Resolves names from the tracer host's sysfs.
#[derive(Debug, Clone)]
pub struct SysfsIfNames {
    root: PathBuf,
}

impl SysfsIfNames {
    /// Resolve from `/sys/class/net`.
    pub fn new() -> Self {
        Self::at(SYSFS_NET)
    }

    /// Resolve from another sysfs-style directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsIfNames {
    fn default() -> Self {
        Self::new()
    }
}

impl IfNameResolver for SysfsIfNames {
    fn name(&self, index: u32) -> Option<String> {
        match index_to_name_in(&self.root, index) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::trace!(index, error = %e, "interface index not resolved");
                None
            }
        }
    }
}

/// Never resolves; indices render numerically.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIfNames;

impl IfNameResolver for NoIfNames {
    fn name(&self, _index: u32) -> Option<String> {
        None
    }
}

/// A fixed index-to-name map, for captured traces and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticIfNames {
    names: HashMap<u32, String>,
}

impl StaticIfNames {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interface.
    pub fn with(mut self, index: u32, name: impl Into<String>) -> Self {
        self.names.insert(index, name.into());
        self
    }
}

impl IfNameResolver for StaticIfNames {
    fn name(&self, index: u32) -> Option<String> {
        self.names.get(&index).cloned()
    }
}
