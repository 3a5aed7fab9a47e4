//! Device node records

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Layer assigned to nodes that do not declare one
pub const DEFAULT_LAYER: u32 = 99;

/// Type assigned to nodes that do not declare one
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

/// A node entry as it appears in a topology document (keyed by id)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Hierarchy layer, smaller is more upstream; negatives clamp to 0
    #[serde(default, deserialize_with = "lenient_layer")]
    pub layer: Option<u32>,
    /// Device category
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    /// Upstream device this node depends on
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Active/standby peer group
    #[serde(default)]
    pub redundancy_group: Option<String>,
    /// In-chassis redundancy (e.g. "PSU")
    #[serde(default)]
    pub internal_redundancy: Option<String>,
    /// Free-form attributes (vendor, OS, ...); non-string values are stringified
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: BTreeMap<String, String>,
}

fn lenient_layer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let layer = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(layer.map(|l| l.clamp(0, i64::from(u32::MAX)) as u32))
}

fn lenient_metadata<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let Some(Value::Object(map)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

/// A device in the topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub layer: u32,
    #[serde(rename = "type")]
    pub node_type: String,
    pub parent_id: Option<String>,
    pub redundancy_group: Option<String>,
    pub internal_redundancy: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Node {
    /// Build a node from its document entry, applying defaults
    pub fn from_spec(id: impl Into<String>, spec: NodeSpec) -> Self {
        Self {
            id: id.into(),
            layer: spec.layer.unwrap_or(DEFAULT_LAYER),
            node_type: spec.node_type.unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            parent_id: spec.parent_id,
            redundancy_group: spec.redundancy_group,
            internal_redundancy: spec.internal_redundancy,
            metadata: spec.metadata,
        }
    }

    /// Create a bare node (type UNKNOWN, no relationships)
    pub fn new(id: impl Into<String>, layer: u32) -> Self {
        Self::from_spec(
            id,
            NodeSpec {
                layer: Some(layer),
                ..Default::default()
            },
        )
    }

    /// Set the device type
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    /// Set the parent
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the redundancy group
    pub fn with_redundancy_group(mut self, group: impl Into<String>) -> Self {
        self.redundancy_group = Some(group.into());
        self
    }

    /// Add a metadata attribute
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Case-insensitive substring match against id, type and metadata values
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.id.to_lowercase().contains(&needle)
            || self.node_type.to_lowercase().contains(&needle)
            || self
                .metadata
                .values()
                .any(|v| v.to_lowercase().contains(&needle))
    }
}
