//! Named fault scenarios

use crate::simulator::CascadeFailureSimulator;
use alarm::Alarm;
use serde::{Deserialize, Serialize};
use topology::{NodeFilter, TopologyGraph};

/// A named fault to inject into a topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// No fault
    Normal,
    /// Total WAN loss at the edge router
    WanOutage,
    /// One firewall of an HA pair loses a power supply
    FirewallSingleLoss,
    /// Access-layer switch degrades without alarming upstream
    L2SilentFailure,
}

impl Scenario {
    /// All scenarios
    pub const ALL: [Scenario; 4] = [
        Scenario::Normal,
        Scenario::WanOutage,
        Scenario::FirewallSingleLoss,
        Scenario::L2SilentFailure,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Normal => "normal",
            Scenario::WanOutage => "wan_outage",
            Scenario::FirewallSingleLoss => "firewall_single_loss",
            Scenario::L2SilentFailure => "l2_silent_failure",
        }
    }

    /// Look up a scenario by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Scenario::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Filter selecting the failing node, if the scenario has one
    pub fn root_filter(&self) -> Option<NodeFilter> {
        match self {
            Scenario::Normal => None,
            Scenario::WanOutage => Some(NodeFilter::of_type("ROUTER")),
            Scenario::FirewallSingleLoss => Some(NodeFilter::of_type("FIREWALL")),
            Scenario::L2SilentFailure => Some(NodeFilter::of_type("SWITCH").at_layer(4)),
        }
    }

    /// Root alarm message; `None` uses the simulator default
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            Scenario::Normal | Scenario::WanOutage => None,
            Scenario::FirewallSingleLoss => Some("Power Supply: Single Loss"),
            Scenario::L2SilentFailure => Some("Link Degraded"),
        }
    }

    /// Alarms for this scenario; empty if the topology has no matching root
    pub fn alarms(&self, simulator: &CascadeFailureSimulator, topology: &TopologyGraph) -> Vec<Alarm> {
        let Some(filter) = self.root_filter() else {
            return Vec::new();
        };

        match topology.find_first(&filter) {
            Some(root) => simulator.simulate(topology, &root.id, self.failure_message()),
            None => Vec::new(),
        }
    }
}
