//! Read-only topology graph

use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Filter for [`TopologyGraph::find_first`]
///
/// Every supplied field must match; absent fields match anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeFilter {
    /// Exact device type (case-insensitive)
    pub node_type: Option<String>,
    /// Exact layer
    pub layer: Option<u32>,
    /// Substring of id, type or any metadata value (case-insensitive)
    pub keyword: Option<String>,
}

impl NodeFilter {
    /// Match nodes of the given type
    pub fn of_type(node_type: impl Into<String>) -> Self {
        Self {
            node_type: Some(node_type.into()),
            ..Default::default()
        }
    }

    /// Restrict to a layer
    pub fn at_layer(mut self, layer: u32) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Restrict to nodes matching a keyword
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    fn matches(&self, node: &Node) -> bool {
        if let Some(t) = &self.node_type {
            if !node.node_type.eq_ignore_ascii_case(t) {
                return false;
            }
        }
        if let Some(layer) = self.layer {
            if node.layer != layer {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            if !node.matches_keyword(keyword) {
                return false;
            }
        }
        true
    }
}

/// Device topology for one (tenant, network) scope
///
/// Nodes are held in id order, which is the iteration order of every query.
/// The graph is never mutated after construction; reloads build a new one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyGraph {
    nodes: BTreeMap<String, Node>,
}

impl TopologyGraph {
    /// Create an empty topology
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a topology from nodes; a later node with a duplicate id replaces the earlier one
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
        }
    }

    /// Look up a node by id
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Whether the topology contains a node
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Layer of a node, if present
    pub fn layer_of(&self, id: &str) -> Option<u32> {
        self.nodes.get(id).map(|n| n.layer)
    }

    /// First node (in id order) matching the filter
    ///
    /// This is first-match, not best-match: several nodes may satisfy the
    /// filter and only the first is returned.
    pub fn find_first(&self, filter: &NodeFilter) -> Option<&Node> {
        self.nodes.values().find(|n| filter.matches(n))
    }

    /// Direct children of a node
    pub fn children(&self, id: &str) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| n.parent_id.as_deref() == Some(id))
            .collect()
    }

    /// Other members of the node's redundancy group
    pub fn redundancy_peers(&self, id: &str) -> Vec<&Node> {
        let Some(group) = self.get(id).and_then(|n| n.redundancy_group.as_deref()) else {
            return Vec::new();
        };

        self.redundancy_group_members(group)
            .into_iter()
            .filter(|n| n.id != id)
            .collect()
    }

    /// All members of a redundancy group
    pub fn redundancy_group_members(&self, group: &str) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| n.redundancy_group.as_deref() == Some(group))
            .collect()
    }

    /// Nodes reachable from `id` through parent->child edges, breadth-first
    ///
    /// The root itself is not included. A visited set keeps malformed
    /// (cyclic) documents from looping.
    pub fn descendants(&self, id: &str) -> Vec<&Node> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(id);

        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(id);

        let mut out = Vec::new();
        while let Some(current) = queue.pop_front() {
            for child in self.children(current) {
                if visited.insert(child.id.as_str()) {
                    out.push(child);
                    queue.push_back(child.id.as_str());
                }
            }
        }
        out
    }

    /// Iterate nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the topology has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
