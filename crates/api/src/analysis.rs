//! Per-scope analysis pipeline
//!
//! Runs both engines over one scope's alarms and attaches the runbook.

use crate::error::ApiError;
use alarm::Alarm;
use inference_engine::{runbook, DeterministicInferenceEngine, EngineConfig, InferenceResult, Runbook};
use serde::Serialize;
use signature_scoring::{Candidate, ScoringConfig, Signature, SignatureCache, SignatureScoringEngine};
use std::sync::Arc;
use std::time::Instant;
use topology::{TopologyGraph, TopologyStore};
use tracing::{debug, info};
use uuid::Uuid;

/// Scored candidate with its band label
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub band: &'static str,
}

/// Combined verdict for one scope
#[derive(Debug, Clone, Serialize)]
pub struct ScopeAnalysis {
    pub analysis_id: Uuid,
    pub tenant: String,
    pub network: String,
    pub alarm_count: usize,
    pub verdict: InferenceResult,
    pub runbook: &'static Runbook,
    pub candidates: Vec<RankedCandidate>,
}

impl ScopeAnalysis {
    /// Top candidate id, unless the scope is operating normally
    pub fn suspected(&self) -> Option<String> {
        self.candidates
            .first()
            .filter(|c| c.candidate.probability > 0.0)
            .map(|c| c.candidate.id.clone())
    }
}

/// Reject ids that could escape the data root
pub fn validate_scope_id(kind: &str, id: &str) -> Result<(), ApiError> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("invalid {} id: {:?}", kind, id)))
    }
}

/// Analyzes scopes with shared engine settings and cached signature tables
#[derive(Default)]
pub struct Analyzer {
    engine: EngineConfig,
    scoring: ScoringConfig,
    signatures: SignatureCache,
}

impl Analyzer {
    pub fn new(engine: EngineConfig, scoring: ScoringConfig) -> Self {
        Self {
            engine,
            scoring,
            signatures: SignatureCache::new(),
        }
    }

    /// Load the scope's topology and analyze `alarms` against it
    pub fn analyze_scope(
        &self,
        store: &TopologyStore,
        tenant: &str,
        network: &str,
        alarms: &[Alarm],
    ) -> Result<ScopeAnalysis, ApiError> {
        validate_scope_id("tenant", tenant)?;
        validate_scope_id("network", network)?;

        let topology = store.get(tenant, network)?;
        let table = self.signatures.get(&store.paths(tenant, network).config_dir)?;
        Ok(self.analyze_topology(&topology, table, tenant, network, alarms))
    }

    fn analyze_topology(
        &self,
        topology: &TopologyGraph,
        signatures: Arc<[Signature]>,
        tenant: &str,
        network: &str,
        alarms: &[Alarm],
    ) -> ScopeAnalysis {
        let started = Instant::now();

        let verdict = DeterministicInferenceEngine::with_config(topology, self.engine.clone()).analyze(alarms);
        let candidates: Vec<RankedCandidate> =
            SignatureScoringEngine::with_table(topology, signatures, self.scoring.clone())
                .analyze(alarms)
                .into_iter()
                .map(|candidate| RankedCandidate {
                    band: candidate.band().as_str(),
                    candidate,
                })
                .collect();

        let elapsed = started.elapsed().as_secs_f64();
        metrics::counter!("rca_analyses_total").increment(1);
        metrics::counter!("rca_candidates_total").increment(candidates.len() as u64);
        metrics::histogram!("rca_analysis_duration_seconds").record(elapsed);

        let analysis = ScopeAnalysis {
            analysis_id: Uuid::new_v4(),
            tenant: tenant.to_string(),
            network: network.to_string(),
            alarm_count: alarms.len(),
            runbook: runbook(verdict.sop_key),
            verdict,
            candidates,
        };

        match analysis.verdict.root_cause_node_id.as_deref() {
            Some(root) => info!(
                "{}/{}: root cause {} ({} alarms, {} candidates)",
                tenant,
                network,
                root,
                alarms.len(),
                analysis.candidates.len()
            ),
            None => debug!("{}/{}: {}", tenant, network, analysis.verdict.reason),
        }
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::SopKey;
    use topology::Registry;

    fn store() -> TopologyStore {
        TopologyStore::new(Registry::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures")))
    }

    #[test]
    fn test_scope_id_validation() {
        assert!(validate_scope_id("tenant", "A").is_ok());
        assert!(validate_scope_id("network", "branch-01").is_ok());
        assert!(validate_scope_id("tenant", "..").is_err());
        assert!(validate_scope_id("tenant", "a/b").is_err());
        assert!(validate_scope_id("tenant", "").is_err());
    }

    #[test]
    fn test_wan_outage_scope() {
        let alarms = vec![
            Alarm::critical("WAN_ROUTER_01", "Device Down"),
            Alarm::warning("CORE_SW_01", "Uplink Down"),
        ];
        let analysis = Analyzer::default()
            .analyze_scope(&store(), "A", "default", &alarms)
            .unwrap();

        assert_eq!(analysis.verdict.root_cause_node_id.as_deref(), Some("WAN_ROUTER_01"));
        assert_eq!(analysis.runbook.key, SopKey::WanFailure);
        assert_eq!(analysis.alarm_count, 2);
        assert_eq!(analysis.suspected().as_deref(), Some("WAN_ROUTER_01"));
    }

    #[test]
    fn test_scope_override_table_applies() {
        let analyzer = Analyzer::default();
        let alarms = vec![Alarm::warning("BR_FW_01", "Session table 95% full")];
        let analysis = analyzer.analyze_scope(&store(), "B", "branch", &alarms).unwrap();
        assert_eq!(analysis.candidates[0].candidate.category, "Security/Policy");

        // second request reuses the cached table
        analyzer.analyze_scope(&store(), "B", "branch", &alarms).unwrap();
        assert_eq!(analyzer.signatures.len(), 1);
    }

    #[test]
    fn test_quiet_scope_has_no_suspect() {
        let analysis = Analyzer::default()
            .analyze_scope(&store(), "B", "branch", &[])
            .unwrap();
        assert!(analysis.verdict.root_cause_node_id.is_none());
        assert!(analysis.suspected().is_none());
        assert_eq!(analysis.candidates[0].band, "monitor");
    }

    #[test]
    fn test_absent_scope_not_cached() {
        let store = store();
        let alarms = vec![Alarm::critical("X", "Device Down")];
        for network in ["ghost-1", "ghost-2", "ghost-3"] {
            let analysis = Analyzer::default()
                .analyze_scope(&store, "Z", network, &alarms)
                .unwrap();
            assert!(analysis.verdict.root_cause_node_id.is_none());
        }
        assert_eq!(store.cached_scopes(), 0);
    }

    #[test]
    fn test_traversal_rejected() {
        let result = Analyzer::default().analyze_scope(&store(), "..", "default", &[]);
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
