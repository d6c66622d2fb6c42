// Error types for the inventory engine.
// Separates transport, cache-file, filesystem, serialization and configuration failures.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Broad failure category, used by the binary for exit codes and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote fetch unreachable or rejected.
    Connection,
    /// Cache file unreadable or not valid JSON.
    Parse,
    /// Cache directory missing or not writable.
    Filesystem,
    /// Configuration file missing, malformed or invalid.
    Config,
    /// Inventory or host detail could not be rendered as JSON.
    Serialization,
}

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Cobbler API request failed: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Cobbler API returned HTTP {status}")]
    HttpStatus { status: reqwest::StatusCode },

    #[error("Cobbler API fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("Malformed XML-RPC response: {0}")]
    Protocol(String),

    #[error("Failed to read cache file {}: {source}", path.display())]
    CacheUnreadable { path: PathBuf, source: io::Error },

    #[error("Cache file {} is not valid JSON: {source}", path.display())]
    CacheCorrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write cache file {}: {source}", path.display())]
    CacheWrite { path: PathBuf, source: io::Error },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigUnreadable { path: PathBuf, source: io::Error },

    #[error("Invalid config file {}: {source}", path.display())]
    ConfigSyntax {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config value for `{field}`: {reason}")]
    ConfigInvalid { field: &'static str, reason: String },
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) | Self::HttpStatus { .. } | Self::Fault { .. } | Self::Protocol(_) => {
                ErrorKind::Connection
            }
            Self::CacheUnreadable { .. } | Self::CacheCorrupt { .. } => ErrorKind::Parse,
            Self::CacheWrite { .. } => ErrorKind::Filesystem,
            Self::Json(_) => ErrorKind::Serialization,
            Self::ConfigUnreadable { .. } | Self::ConfigSyntax { .. } | Self::ConfigInvalid { .. } => {
                ErrorKind::Config
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
