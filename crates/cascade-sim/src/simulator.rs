//! Cascade failure propagation

use alarm::{Alarm, Severity};
use serde::{Deserialize, Serialize};
use topology::{Node, TopologyGraph};
use tracing::debug;

const ROUTER: &str = "ROUTER";
const FIREWALL: &str = "FIREWALL";
const ACCESS_POINT: &str = "ACCESS_POINT";

/// How a dependent node relates to the failed root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Direct child with no children of its own
    DirectLeaf,
    /// Direct child of a routing/security gateway
    GatewayChild,
    /// Direct child of any other device
    DirectChild,
    /// Access point further downstream
    DownstreamAccessPoint,
    /// Any other node further downstream
    Downstream,
}

impl Relation {
    fn classify(topology: &TopologyGraph, root: &Node, node: &Node) -> Self {
        let direct = node.parent_id.as_deref() == Some(root.id.as_str());
        if direct {
            if topology.children(&node.id).is_empty() {
                Relation::DirectLeaf
            } else if is_gateway(root) {
                Relation::GatewayChild
            } else {
                Relation::DirectChild
            }
        } else if node.node_type.eq_ignore_ascii_case(ACCESS_POINT) {
            Relation::DownstreamAccessPoint
        } else {
            Relation::Downstream
        }
    }
}

fn is_gateway(node: &Node) -> bool {
    node.node_type.eq_ignore_ascii_case(ROUTER) || node.node_type.eq_ignore_ascii_case(FIREWALL)
}

/// Message/severity table applied to dependents of a failed node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationPolicy {
    /// Root message when the caller supplies none
    pub default_root_message: String,
    /// Direct leaf dependents
    pub leaf_message: String,
    /// Direct dependents of a router or firewall
    pub gateway_message: String,
    /// Direct dependents of other devices, and deeper non-AP nodes
    pub uplink_message: String,
    /// Deeper access points
    pub controller_message: String,
}

impl Default for PropagationPolicy {
    fn default() -> Self {
        Self {
            default_root_message: "Device Down".to_string(),
            leaf_message: "Connection Lost".to_string(),
            gateway_message: "Gateway Unreachable".to_string(),
            uplink_message: "Uplink Down".to_string(),
            controller_message: "Controller Unreachable".to_string(),
        }
    }
}

impl PropagationPolicy {
    /// Message and severity for a dependent
    pub fn derive(&self, relation: Relation) -> (&str, Severity) {
        match relation {
            Relation::DirectLeaf => (&self.leaf_message, Severity::Critical),
            Relation::GatewayChild => (&self.gateway_message, Severity::Warning),
            Relation::DirectChild => (&self.uplink_message, Severity::Warning),
            Relation::DownstreamAccessPoint => (&self.controller_message, Severity::Warning),
            Relation::Downstream => (&self.uplink_message, Severity::Warning),
        }
    }
}

/// Generates the alarms a single root failure is expected to trigger
#[derive(Debug, Clone, Default)]
pub struct CascadeFailureSimulator {
    policy: PropagationPolicy,
}

impl CascadeFailureSimulator {
    /// Create a simulator with a custom policy
    pub fn new(policy: PropagationPolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    pub fn policy(&self) -> &PropagationPolicy {
        &self.policy
    }

    /// Alarms for `root_id` failing, root first, then dependents breadth-first
    ///
    /// A root absent from the topology still gets its own alarm.
    pub fn simulate(&self, topology: &TopologyGraph, root_id: &str, message: Option<&str>) -> Vec<Alarm> {
        let root_message = message.unwrap_or(&self.policy.default_root_message);
        let mut alarms = vec![Alarm::critical(root_id, root_message)];

        let Some(root) = topology.get(root_id) else {
            debug!("Cascade root {} not in topology", root_id);
            return alarms;
        };

        for node in topology.descendants(root_id) {
            let (msg, severity) = self.policy.derive(Relation::classify(topology, root, node));
            alarms.push(Alarm::new(node.id.as_str(), msg, severity));
        }

        debug!("Cascade from {} produced {} alarms", root_id, alarms.len());
        alarms
    }
}
