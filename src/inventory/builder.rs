// Inventory derivation.
// Turns the raw system list into the group index and the host detail map.

use serde_json::{Map, Value};
use tracing::debug;

use crate::cobbler::{ClassKey, HostRecord};

use super::Inventory;

/// Builds an [`Inventory`] from system records.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryBuilder {
    class_key: ClassKey,
    safe_group_names: bool,
}

impl InventoryBuilder {
    pub fn new(class_key: ClassKey) -> Self {
        Self {
            class_key,
            safe_group_names: false,
        }
    }

    /// Replace characters Ansible dislikes in group names with underscores.
    pub fn with_safe_group_names(mut self, enabled: bool) -> Self {
        self.safe_group_names = enabled;
        self
    }

    /// Derive the group index and host details, in record order.
    ///
    /// Records that resolve to no hostname are skipped. A hostname seen twice
    /// is appended to its groups twice and keeps the later record's detail.
    pub fn build<I>(&self, records: I) -> Inventory
    where
        I: IntoIterator<Item = HostRecord>,
    {
        let mut inventory = Inventory::default();

        for record in records {
            let Some(hostname) = resolve_hostname(&record).map(str::to_string) else {
                let name = record
                    .raw()
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("?");
                debug!(name, "skipping system without a resolvable hostname");
                continue;
            };

            let mut groups = vec![record.status.clone(), record.profile.clone()];
            groups.extend(record.classes(self.class_key));
            for group in groups {
                inventory
                    .groups
                    .entry(self.group_name(group))
                    .or_default()
                    .push(hostname.clone());
            }

            inventory.hosts.insert(hostname, host_detail(&record));
        }

        inventory
    }

    fn group_name(&self, name: String) -> String {
        if self.safe_group_names {
            safe_group_name(&name)
        } else {
            name
        }
    }
}

/// The name a system is known by in the inventory.
///
/// The primary hostname wins; otherwise the first interface (by name) that is
/// a management interface or not statically configured supplies its DNS name.
pub fn resolve_hostname(record: &HostRecord) -> Option<&str> {
    if !record.hostname.is_empty() {
        return Some(&record.hostname);
    }

    record
        .interfaces
        .values()
        .filter(|iface| iface.is_name_source())
        .filter_map(|iface| iface.dns_name.as_deref())
        .find(|name| !name.is_empty())
}

/// Raw record with the metadata bag flattened on top.
fn host_detail(record: &HostRecord) -> Map<String, Value> {
    let mut detail = record.raw().clone();
    if let Some(metadata) = record.metadata() {
        for (key, value) in metadata {
            detail.insert(key.clone(), value.clone());
        }
    }
    detail
}

/// Replace anything outside `[A-Za-z0-9-]` with underscores.
fn safe_group_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
