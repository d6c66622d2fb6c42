// Cache path utilities.
// Locates the index and detail cache files inside the cache directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// File holding the per-host detail map.
pub const DETAIL_FILE: &str = "ansible-cobbler.cache";
/// File holding the group index.
pub const INDEX_FILE: &str = "ansible-cobbler.index";

/// Get the default cache directory (~/.cache/cobbler-inventory on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cobbler-inventory").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// The pair of cache files that make up one persisted inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    /// Hostname -> host detail.
    pub detail: PathBuf,
    /// Group name -> hostnames.
    pub index: PathBuf,
}

impl CachePaths {
    pub fn new(detail: impl Into<PathBuf>, index: impl Into<PathBuf>) -> Self {
        Self {
            detail: detail.into(),
            index: index.into(),
        }
    }

    /// Standard file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DETAIL_FILE), dir.join(INDEX_FILE))
    }
}
