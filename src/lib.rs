//! cobbler-inventory - Ansible dynamic inventory backed by Cobbler
//!
//! - Fetches every system over the Cobbler XML-RPC API
//! - Groups hosts by status, profile and ownership class
//! - Persists the group index and host details as a pair of JSON cache files
//! - Serves `--list` / `--host` from the cache until it goes stale

pub mod cache;
pub mod cli;
pub mod cobbler;
pub mod config;
pub mod error;
pub mod inventory;

pub use error::{ErrorKind, InventoryError, Result};
