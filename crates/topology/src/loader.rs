//! Topology document loading

use crate::graph::TopologyGraph;
use crate::node::{Node, NodeSpec};
use crate::TopologyError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Parse a topology document (JSON object of id -> node entry)
///
/// Fails only when the document itself is not a JSON object; a malformed
/// entry is skipped and the remaining nodes are kept.
pub fn parse_document(json: &str) -> Result<TopologyGraph, TopologyError> {
    let raw: BTreeMap<String, Value> =
        serde_json::from_str(json).map_err(|e| TopologyError::Parse(e.to_string()))?;

    let nodes = raw
        .into_iter()
        .filter_map(|(id, entry)| match NodeSpec::deserialize(entry) {
            Ok(spec) => Some(Node::from_spec(id, spec)),
            Err(e) => {
                warn!("Skipping malformed node {}: {}", id, e);
                None
            }
        });
    Ok(TopologyGraph::from_nodes(nodes))
}

/// Load a topology from disk
///
/// A missing, unreadable or malformed document yields an empty topology.
pub fn load_from_path(path: &Path) -> TopologyGraph {
    match try_load(path) {
        Ok(topology) => {
            debug!("Loaded {} nodes from {}", topology.len(), path.display());
            topology
        }
        Err(e) => {
            warn!("Using empty topology: {}", e);
            TopologyGraph::new()
        }
    }
}

fn try_load(path: &Path) -> Result<TopologyGraph, TopologyError> {
    let text = std::fs::read_to_string(path).map_err(|e| TopologyError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_document(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DEFAULT_LAYER, UNKNOWN_TYPE};

    #[test]
    fn test_parse_with_defaults() {
        let topo = parse_document(
            r#"{
                "R1": { "layer": 1, "type": "ROUTER" },
                "PRN": { "parent_id": "R1", "metadata": { "vendor": "HP" } }
            }"#,
        )
        .unwrap();

        assert_eq!(topo.len(), 2);
        let printer = topo.get("PRN").unwrap();
        assert_eq!(printer.layer, DEFAULT_LAYER);
        assert_eq!(printer.node_type, UNKNOWN_TYPE);
        assert_eq!(printer.parent_id.as_deref(), Some("R1"));
        assert_eq!(printer.metadata.get("vendor").map(String::as_str), Some("HP"));
    }

    #[test]
    fn test_lenient_layer_and_metadata() {
        let topo = parse_document(
            r#"{
                "SW": { "layer": -1, "type": "SWITCH", "metadata": { "ports": 48, "poe": true, "site": null } },
                "AP": { "layer": "5", "parent_id": "SW", "metadata": null },
                "FW": { "layer": 2.0, "metadata": "not-a-map" }
            }"#,
        )
        .unwrap();

        assert_eq!(topo.len(), 3);
        let sw = topo.get("SW").unwrap();
        assert_eq!(sw.layer, 0);
        assert_eq!(sw.metadata.get("ports").map(String::as_str), Some("48"));
        assert_eq!(sw.metadata.get("poe").map(String::as_str), Some("true"));
        assert!(!sw.metadata.contains_key("site"));

        let ap = topo.get("AP").unwrap();
        assert_eq!(ap.layer, 5);
        assert!(ap.metadata.is_empty());

        let fw = topo.get("FW").unwrap();
        assert_eq!(fw.layer, 2);
        assert!(fw.metadata.is_empty());
    }

    #[test]
    fn test_malformed_entry_skipped() {
        let topo = parse_document(
            r#"{
                "R1": { "layer": 1, "type": "ROUTER" },
                "BAD": { "layer": 2, "type": 7 },
                "JUNK": 42,
                "SW": { "layer": 3, "parent_id": "R1" }
            }"#,
        )
        .unwrap();

        assert_eq!(topo.len(), 2);
        assert!(topo.contains("R1"));
        assert!(topo.contains("SW"));
        assert!(!topo.contains("BAD"));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_document("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let topo = load_from_path(Path::new("/definitely/not/here/topology.json"));
        assert!(topo.is_empty());
    }

    #[test]
    fn test_reference_fixture_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures/tenants/A/networks/default/topology.json");
        let topo = load_from_path(&path);

        assert_eq!(topo.len(), 10);
        assert_eq!(
            topo.get("FW_01_PRIMARY").and_then(|n| n.internal_redundancy.as_deref()),
            Some("PSU")
        );
    }
}
