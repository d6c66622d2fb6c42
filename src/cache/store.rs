// Cache store for reading and writing cache files.
// Handles JSON serialization and file metadata; validity decisions live in the gate.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{InventoryError, Result};

/// Serialize `data` as sorted-key, two-space indented JSON.
pub fn to_pretty_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    // Maps are BTreeMap-backed, so keys come out sorted
    Ok(serde_json::to_string_pretty(data)?)
}

/// Write data to a cache file as JSON, replacing its contents.
///
/// The write is not atomic and the parent directory must already exist.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let json = to_pretty_json(data)?;
    fs::write(path, json).map_err(|source| InventoryError::CacheWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a whole cache file and parse it as JSON.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|source| InventoryError::CacheUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| InventoryError::CacheCorrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Get the modification time of a cache file.
pub fn modified_at(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Time elapsed since the file was last written, or None if it cannot be stat'ed.
pub fn age(path: &Path, now: DateTime<Utc>) -> Option<TimeDelta> {
    let modified: DateTime<Utc> = modified_at(path).ok()?.into();
    Some(now.signed_duration_since(modified))
}
