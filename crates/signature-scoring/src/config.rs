//! Scoring configuration

use serde::{Deserialize, Serialize};

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score added per alarm on the device
    pub per_alarm_bonus: f64,

    /// Score of alarmed devices no signature matches
    pub unknown_score: f64,

    /// Downstream link losses needed to flag a silent parent
    pub silent_threshold: usize,

    /// Score of a synthesized silent-parent candidate
    pub silent_score: f64,

    /// Score of a silent parent that also alarmed itself
    pub confirmed_silent_score: f64,

    /// Score of candidates under a silent parent
    pub suppressed_score: f64,

    /// Extra demotion per silent ancestor above a silent parent
    pub suppression_step: f64,

    /// Message fragments that denote loss of connectivity
    pub link_loss_keywords: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            per_alarm_bonus: 0.02,
            unknown_score: 0.3,
            silent_threshold: 2,
            silent_score: 0.99,
            confirmed_silent_score: 1.0,
            suppressed_score: 0.55,
            suppression_step: 0.1,
            link_loss_keywords: vec!["connection lost".to_string(), "interface down".to_string()],
        }
    }
}

impl ScoringConfig {
    /// Flag a silent parent on the first downstream loss
    pub fn sensitive() -> Self {
        Self {
            silent_threshold: 1,
            ..Default::default()
        }
    }

    /// Require more corroborating downstream losses
    pub fn conservative() -> Self {
        Self {
            silent_threshold: 3,
            ..Default::default()
        }
    }
}
