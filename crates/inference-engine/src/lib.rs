//! Deterministic Root-Cause Inference
//!
//! Resolves an alarm set to exactly one root-cause verdict by applying the
//! hierarchy, redundancy and silent-failure rules in fixed order, and maps
//! each verdict to a remediation runbook.

mod engine;
mod runbook;

pub use engine::{DeterministicInferenceEngine, EngineConfig, InferenceResult, Rule, SopKey, TieBreak};
pub use runbook::{runbook, Runbook};
