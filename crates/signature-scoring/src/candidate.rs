//! Ranked root-cause candidates

use serde::{Deserialize, Serialize};

/// Consumer-facing probability tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// Above 0.8: actionable root cause
    Critical,
    /// Above 0.4 up to 0.8: suspected, needs investigation
    Warning,
    /// 0.4 and below: monitor only
    Monitor,
}

impl ScoreBand {
    /// Band for a probability
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.8 {
            ScoreBand::Critical
        } else if probability > 0.4 {
            ScoreBand::Warning
        } else {
            ScoreBand::Monitor
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Critical => "critical",
            ScoreBand::Warning => "warning",
            ScoreBand::Monitor => "monitor",
        }
    }
}

/// A scored root-cause hypothesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Device id (may have no alarms of its own)
    pub id: String,
    pub category: String,
    pub label: String,
    /// Confidence in [0, 1]
    pub probability: f64,
    /// Contributing alarm messages
    pub evidence: Vec<String>,
    /// Narrative of the simulated upstream check; empty unless correlated
    pub verification_log: String,
}

impl Candidate {
    /// Sentinel returned when nothing is wrong
    pub fn normal() -> Self {
        Self {
            id: "System".to_string(),
            category: "Normal".to_string(),
            label: "Operating normally".to_string(),
            probability: 0.0,
            evidence: Vec::new(),
            verification_log: String::new(),
        }
    }

    /// Tier of this candidate
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_probability(self.probability)
    }
}
