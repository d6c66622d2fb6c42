// Inventory module.
// Derivation, cache gating and rendering of the Ansible inventory.

pub mod builder;
pub mod gate;
pub mod output;

use std::collections::BTreeMap;

use serde_json::{Map, Value};

pub use builder::{InventoryBuilder, resolve_hostname};
pub use gate::{CacheGate, Session, is_cache_valid};
pub use output::{META_KEY, render_host, render_inventory};

/// Group name -> hostnames, in provisioning order.
pub type GroupIndex = BTreeMap<String, Vec<String>>;

/// Hostname -> host detail.
pub type HostCache = BTreeMap<String, Map<String, Value>>;

/// Group index and host details, always built and persisted together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub groups: GroupIndex,
    pub hosts: HostCache,
}

impl Inventory {
    /// Detail for a single host.
    pub fn host(&self, hostname: &str) -> Option<&Map<String, Value>> {
        self.hosts.get(hostname)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.hosts.is_empty()
    }
}
