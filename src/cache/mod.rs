// Cache module for local filesystem caching.
// Persists the group index and host detail map between invocations.

pub mod paths;
pub mod store;

pub use paths::{CachePaths, DETAIL_FILE, INDEX_FILE, cache_dir};
pub use store::{age, modified_at, read_json, to_pretty_json, write_json};
