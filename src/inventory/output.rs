// Inventory rendering.
// Produces the JSON documents Ansible reads from a dynamic inventory script.

use serde_json::{Map, Value};

use crate::cache::to_pretty_json;
use crate::error::Result;

use super::Inventory;

/// Reserved top-level key carrying per-host variables.
pub const META_KEY: &str = "_meta";

/// Render the full inventory: every group plus `_meta.hostvars`.
///
/// With a non-empty `namespace`, each host's detail is nested under that key
/// (`{"cobbler": {...}}`); an empty namespace exposes the detail directly.
pub fn render_inventory(inventory: &Inventory, namespace: &str) -> Result<String> {
    let mut document: Map<String, Value> = inventory
        .groups
        .iter()
        .map(|(group, hosts)| (group.clone(), Value::from(hosts.clone())))
        .collect();

    let hostvars: Map<String, Value> = inventory
        .hosts
        .iter()
        .map(|(hostname, detail)| {
            let vars = if namespace.is_empty() {
                detail.clone()
            } else {
                let mut vars = Map::new();
                vars.insert(namespace.to_string(), Value::Object(detail.clone()));
                vars
            };
            (hostname.clone(), Value::Object(vars))
        })
        .collect();

    let mut meta = Map::new();
    meta.insert("hostvars".to_string(), Value::Object(hostvars));
    document.insert(META_KEY.to_string(), Value::Object(meta));

    to_pretty_json(&document)
}

/// Render one host's detail, or `{}` when the host is unknown.
pub fn render_host(detail: Option<&Map<String, Value>>) -> Result<String> {
    match detail {
        Some(detail) => to_pretty_json(detail),
        None => to_pretty_json(&Map::new()),
    }
}
