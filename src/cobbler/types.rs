// Cobbler system record types.
// Typed view over the fields the inventory needs; everything else is kept verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Marker Cobbler reports for attributes inherited from the profile.
const INHERIT_MARKER: &str = "<<inherit>>";

/// Record attribute used as the ownership-class grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassKey {
    #[default]
    Owners,
    MgmtClasses,
}

impl ClassKey {
    pub fn field_name(&self) -> &'static str {
        match self {
            ClassKey::Owners => "owners",
            ClassKey::MgmtClasses => "mgmt_classes",
        }
    }
}

/// Network interface of a Cobbler system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Interface {
    #[serde(default)]
    pub management: bool,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Interface {
    /// Whether this interface may supply the host's DNS name.
    pub fn is_name_source(&self) -> bool {
        self.management || !self.is_static
    }
}

/// A system as returned by `get_systems`.
///
/// The typed fields are a read-only view; the record serializes back to
/// exactly the attributes Cobbler sent.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct HostRecord {
    pub hostname: String,
    pub status: String,
    pub profile: String,
    pub interfaces: BTreeMap<String, Interface>,
    /// Flat metadata bag merged onto the host detail.
    pub ks_meta: Option<Value>,
    raw: Map<String, Value>,
}

/// Fields the inventory reads from a system record.
#[derive(Deserialize)]
struct RecordFields {
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    profile: String,
    #[serde(default)]
    interfaces: BTreeMap<String, Interface>,
    #[serde(default)]
    ks_meta: Option<Value>,
}

impl TryFrom<Map<String, Value>> for HostRecord {
    type Error = serde_json::Error;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let fields: RecordFields = serde_json::from_value(Value::Object(raw.clone()))?;
        Ok(Self {
            hostname: fields.hostname,
            status: fields.status,
            profile: fields.profile,
            interfaces: fields.interfaces,
            ks_meta: fields.ks_meta,
            raw,
        })
    }
}

impl Serialize for HostRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl HostRecord {
    /// Every attribute as received.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Ownership classes under the given attribute.
    ///
    /// Cobbler reports these either as a list or as a whitespace separated
    /// string; the inheritance marker contributes nothing.
    pub fn classes(&self, key: ClassKey) -> Vec<String> {
        match self.raw.get(key.field_name()) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .filter(|class| *class != INHERIT_MARKER)
                .map(str::to_string)
                .collect(),
            Some(Value::String(joined)) => joined
                .split_whitespace()
                .filter(|class| *class != INHERIT_MARKER)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Metadata entries, if the bag is a JSON object.
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.ks_meta.as_ref().and_then(Value::as_object)
    }
}
