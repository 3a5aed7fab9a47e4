//! Deterministic Inference Engine Implementation

use alarm::{alarmed_devices, Alarm};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use topology::{Node, TopologyGraph};
use tracing::debug;

/// Sort key for alarms on devices missing from the topology
const UNKNOWN_LAYER: u32 = 999;

/// Remediation runbook selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SopKey {
    /// Upstream WAN loss
    WanFailure,
    /// One member of an HA pair down, failover active
    FwHaWarning,
    /// Aggregation device down without alarming
    L2SilentFailure,
    /// Generic / critical escalation
    Default,
}

impl SopKey {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SopKey::WanFailure => "WAN_FAILURE",
            SopKey::FwHaWarning => "FW_HA_WARNING",
            SopKey::L2SilentFailure => "L2_SILENT_FAILURE",
            SopKey::Default => "DEFAULT",
        }
    }
}

/// Which rule produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    NoAlarms,
    UnknownDevice,
    RedundancyTotalFailure,
    RedundancyFailover,
    SilentParent,
    Hierarchy,
}

/// Ordering among alarms that share the lowest layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Device id ascending, then input order
    #[default]
    DeviceId,
    /// Input order only
    InputOrder,
}

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tie_break: TieBreak,
}

/// Verdict of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Root-cause device; `None` means no conclusion
    pub root_cause_node_id: Option<String>,
    /// Human-readable justification
    pub reason: String,
    /// Runbook to apply
    pub sop_key: SopKey,
    /// Alarms supporting the verdict
    pub related_alarms: Vec<Alarm>,
    /// Rule that fired
    pub rule: Rule,
}

impl InferenceResult {
    fn inconclusive(rule: Rule, reason: &str, related_alarms: Vec<Alarm>) -> Self {
        Self {
            root_cause_node_id: None,
            reason: reason.to_string(),
            sop_key: SopKey::Default,
            related_alarms,
            rule,
        }
    }
}

/// Hierarchy / redundancy / silent-failure resolver
///
/// Pure over (topology, alarms): the topology is only read and nothing is
/// kept between calls.
pub struct DeterministicInferenceEngine<'a> {
    topology: &'a TopologyGraph,
    config: EngineConfig,
}

impl<'a> DeterministicInferenceEngine<'a> {
    /// Create an engine with default configuration
    pub fn new(topology: &'a TopologyGraph) -> Self {
        Self::with_config(topology, EngineConfig::default())
    }

    /// Create an engine with explicit configuration
    pub fn with_config(topology: &'a TopologyGraph, config: EngineConfig) -> Self {
        Self { topology, config }
    }

    /// Resolve an alarm set to a single verdict
    pub fn analyze(&self, alarms: &[Alarm]) -> InferenceResult {
        let Some(top_alarm) = self.highest_alarm(alarms) else {
            return InferenceResult::inconclusive(Rule::NoAlarms, "no alarms", Vec::new());
        };

        let Some(top) = self.topology.get(&top_alarm.device_id) else {
            debug!("Top alarm device {} not in topology", top_alarm.device_id);
            return InferenceResult::inconclusive(Rule::UnknownDevice, "unknown device", alarms.to_vec());
        };

        let alarmed = alarmed_devices(alarms);

        let result = if let Some(group) = top.redundancy_group.as_deref() {
            self.redundancy_verdict(top, group, &alarmed, alarms)
        } else {
            self.silent_parent_verdict(top, &alarmed)
                .unwrap_or_else(|| Self::hierarchy_verdict(top, alarms))
        };

        debug!(
            "Verdict {:?} via {:?} ({})",
            result.root_cause_node_id,
            result.rule,
            result.sop_key.as_str()
        );
        result
    }

    /// First alarm after ordering by layer ascending
    fn highest_alarm<'b>(&self, alarms: &'b [Alarm]) -> Option<&'b Alarm> {
        let layer = |a: &Alarm| self.topology.layer_of(&a.device_id).unwrap_or(UNKNOWN_LAYER);

        let mut ordered: Vec<&Alarm> = alarms.iter().collect();
        match self.config.tie_break {
            TieBreak::DeviceId => ordered.sort_by(|a, b| {
                layer(*a)
                    .cmp(&layer(*b))
                    .then_with(|| a.device_id.cmp(&b.device_id))
            }),
            TieBreak::InputOrder => ordered.sort_by_key(|a| layer(*a)),
        }
        ordered.first().copied()
    }

    fn redundancy_verdict(
        &self,
        top: &Node,
        group: &str,
        alarmed: &HashSet<&str>,
        alarms: &[Alarm],
    ) -> InferenceResult {
        let members = self.topology.redundancy_group_members(group);
        let down = members.iter().filter(|m| alarmed.contains(m.id.as_str())).count();

        if down == members.len() {
            InferenceResult {
                root_cause_node_id: Some(top.id.clone()),
                reason: format!(
                    "Redundancy rule: all {} members of HA group {} are down",
                    members.len(),
                    group
                ),
                sop_key: SopKey::Default,
                related_alarms: alarms.to_vec(),
                rule: Rule::RedundancyTotalFailure,
            }
        } else {
            InferenceResult {
                root_cause_node_id: Some(top.id.clone()),
                reason: format!(
                    "Redundancy rule: single-node failure in HA group {} ({} of {} down), failover active",
                    group,
                    down,
                    members.len()
                ),
                sop_key: SopKey::FwHaWarning,
                related_alarms: alarms.to_vec(),
                rule: Rule::RedundancyFailover,
            }
        }
    }

    /// The parent is blamed when every one of its children is alarmed
    fn silent_parent_verdict(&self, top: &Node, alarmed: &HashSet<&str>) -> Option<InferenceResult> {
        let parent = self.topology.get(top.parent_id.as_deref()?)?;
        let children = self.topology.children(&parent.id);

        if children.is_empty() || !children.iter().all(|c| alarmed.contains(c.id.as_str())) {
            return None;
        }

        Some(InferenceResult {
            root_cause_node_id: Some(parent.id.clone()),
            reason: format!(
                "Silent failure inference: parent {} is silent but all {} of its children are down",
                parent.id,
                children.len()
            ),
            sop_key: SopKey::L2SilentFailure,
            related_alarms: Vec::new(),
            rule: Rule::SilentParent,
        })
    }

    fn hierarchy_verdict(top: &Node, alarms: &[Alarm]) -> InferenceResult {
        InferenceResult {
            root_cause_node_id: Some(top.id.clone()),
            reason: format!(
                "Hierarchy rule: {} is the most upstream alarmed device (layer {})",
                top.id, top.layer
            ),
            sop_key: if top.layer == 1 {
                SopKey::WanFailure
            } else {
                SopKey::Default
            },
            related_alarms: alarms.to_vec(),
            rule: Rule::Hierarchy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_sim::{CascadeFailureSimulator, Scenario};

    fn campus() -> TopologyGraph {
        topology::parse_document(include_str!(
            "../../../fixtures/tenants/A/networks/default/topology.json"
        ))
        .unwrap()
    }

    #[test]
    fn test_wan_failure() {
        let topo = campus();
        let alarms = vec![
            Alarm::critical("WAN_ROUTER_01", "Interface Down"),
            Alarm::warning("FW_01_PRIMARY", "Gateway Unreachable"),
            Alarm::warning("CORE_SW_01", "Uplink Down"),
            Alarm::critical("AP_01", "Controller Unreachable"),
        ];

        let result = DeterministicInferenceEngine::new(&topo).analyze(&alarms);
        assert_eq!(result.root_cause_node_id.as_deref(), Some("WAN_ROUTER_01"));
        assert_eq!(result.sop_key, SopKey::WanFailure);
        assert_eq!(result.rule, Rule::Hierarchy);
        assert_eq!(result.related_alarms.len(), 4);
    }

    #[test]
    fn test_fw_redundancy_failover() {
        let topo = campus();
        let alarms = vec![
            Alarm::warning("FW_01_PRIMARY", "Heartbeat Loss"),
            Alarm::critical("FW_01_PRIMARY", "System Crash"),
        ];

        let result = DeterministicInferenceEngine::new(&topo).analyze(&alarms);
        assert_eq!(result.root_cause_node_id.as_deref(), Some("FW_01_PRIMARY"));
        assert_eq!(result.sop_key, SopKey::FwHaWarning);
        assert_eq!(result.rule, Rule::RedundancyFailover);
    }

    #[test]
    fn test_fw_redundancy_total_failure() {
        let topo = campus();
        let alarms = vec![
            Alarm::critical("FW_01_SECONDARY", "Device Down"),
            Alarm::critical("FW_01_PRIMARY", "Device Down"),
        ];

        let result = DeterministicInferenceEngine::new(&topo).analyze(&alarms);
        assert_eq!(result.root_cause_node_id.as_deref(), Some("FW_01_PRIMARY"));
        assert_eq!(result.sop_key, SopKey::Default);
        assert_eq!(result.rule, Rule::RedundancyTotalFailure);
    }

    #[test]
    fn test_silent_failure() {
        let topo = campus();
        let alarms = vec![
            Alarm::critical("AP_01", "Connection Lost"),
            Alarm::critical("AP_02", "Connection Lost"),
        ];

        let result = DeterministicInferenceEngine::new(&topo).analyze(&alarms);
        assert_eq!(result.root_cause_node_id.as_deref(), Some("L2_SW_01"));
        assert_eq!(result.sop_key, SopKey::L2SilentFailure);
        assert!(result.related_alarms.is_empty());
    }

    #[test]
    fn test_partial_children_falls_back_to_hierarchy() {
        let topo = campus();
        let alarms = vec![Alarm::critical("AP_01", "Connection Lost")];

        let result = DeterministicInferenceEngine::new(&topo).analyze(&alarms);
        assert_eq!(result.root_cause_node_id.as_deref(), Some("AP_01"));
        assert_eq!(result.sop_key, SopKey::Default);
    }

    #[test]
    fn test_empty_alarms() {
        let topo = campus();
        let result = DeterministicInferenceEngine::new(&topo).analyze(&[]);
        assert!(result.root_cause_node_id.is_none());
        assert_eq!(result.reason, "no alarms");
        assert_eq!(result.rule, Rule::NoAlarms);
    }

    #[test]
    fn test_unknown_device_sorts_last() {
        let topo = campus();
        let alarms = vec![
            Alarm::info("GHOST", "???"),
            Alarm::warning("CORE_SW_01", "CPU High"),
        ];
        let result = DeterministicInferenceEngine::new(&topo).analyze(&alarms);
        assert_eq!(result.root_cause_node_id.as_deref(), Some("CORE_SW_01"));

        let only_ghost = DeterministicInferenceEngine::new(&topo).analyze(&[Alarm::info("GHOST", "???")]);
        assert!(only_ghost.root_cause_node_id.is_none());
        assert_eq!(only_ghost.reason, "unknown device");
    }

    #[test]
    fn test_tie_break_policies() {
        let topo = campus();
        let alarms = vec![
            Alarm::warning("AP_03", "Controller Unreachable"),
            Alarm::warning("AP_01", "Controller Unreachable"),
        ];

        let by_id = DeterministicInferenceEngine::new(&topo).analyze(&alarms);
        assert_eq!(by_id.root_cause_node_id.as_deref(), Some("AP_01"));

        let config = EngineConfig {
            tie_break: TieBreak::InputOrder,
        };
        let by_input = DeterministicInferenceEngine::with_config(&topo, config).analyze(&alarms);
        assert_eq!(by_input.root_cause_node_id.as_deref(), Some("AP_03"));
    }

    #[test]
    fn test_simulated_scenarios() {
        let topo = campus();
        let sim = CascadeFailureSimulator::default();
        let engine = DeterministicInferenceEngine::new(&topo);

        let wan = engine.analyze(&Scenario::WanOutage.alarms(&sim, &topo));
        assert_eq!(wan.root_cause_node_id.as_deref(), Some("WAN_ROUTER_01"));
        assert_eq!(wan.sop_key, SopKey::WanFailure);

        let fw = engine.analyze(&Scenario::FirewallSingleLoss.alarms(&sim, &topo));
        assert_eq!(fw.root_cause_node_id.as_deref(), Some("FW_01_PRIMARY"));
        assert_eq!(fw.sop_key, SopKey::FwHaWarning);
        assert_eq!(fw.rule, Rule::RedundancyFailover);
    }

    mod props {
        use super::*;
        use alarm::Severity;
        use proptest::prelude::*;

        const DEVICES: [&str; 11] = [
            "WAN_ROUTER_01", "FW_01_PRIMARY", "FW_01_SECONDARY", "CORE_SW_01", "L2_SW_01",
            "L2_SW_02", "AP_01", "AP_02", "AP_03", "AP_04", "GHOST",
        ];

        fn alarm_set() -> impl Strategy<Value = Vec<Alarm>> {
            prop::collection::vec((0usize..DEVICES.len(), any::<bool>()), 0..12).prop_map(|picks| {
                picks
                    .into_iter()
                    .map(|(i, crit)| {
                        let sev = if crit { Severity::Critical } else { Severity::Warning };
                        Alarm::new(DEVICES[i], "Interface Down", sev)
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn analysis_is_deterministic(alarms in alarm_set()) {
                let topo = campus();
                let engine = DeterministicInferenceEngine::new(&topo);
                prop_assert_eq!(engine.analyze(&alarms), engine.analyze(&alarms));
            }

            #[test]
            fn hierarchy_verdict_is_most_upstream(alarms in alarm_set()) {
                let topo = campus();
                let result = DeterministicInferenceEngine::new(&topo).analyze(&alarms);
                if result.rule == Rule::Hierarchy {
                    let root_layer = topo.layer_of(result.root_cause_node_id.as_deref().unwrap()).unwrap();
                    for a in &alarms {
                        let layer = topo.layer_of(&a.device_id).unwrap_or(UNKNOWN_LAYER);
                        prop_assert!(root_layer <= layer);
                    }
                }
            }

            #[test]
            fn silent_parent_when_all_children_down(parent_idx in 0usize..6) {
                let topo = campus();
                let parent = &DEVICES[parent_idx];
                let children = topo.children(parent);
                prop_assume!(!children.is_empty());
                prop_assume!(children.iter().all(|c| c.redundancy_group.is_none()));

                let alarms: Vec<Alarm> = children
                    .iter()
                    .map(|c| Alarm::critical(c.id.as_str(), "Connection Lost"))
                    .collect();
                let result = DeterministicInferenceEngine::new(&topo).analyze(&alarms);
                prop_assert_eq!(result.root_cause_node_id.as_deref(), Some(*parent));
                prop_assert_eq!(result.sop_key, SopKey::L2SilentFailure);
            }
        }
    }
}
