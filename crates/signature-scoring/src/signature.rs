//! Fault signatures

use crate::ScoringError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// File name of a scope's signature override inside its config directory
pub const SIGNATURE_FILE: &str = "signatures.json";

/// Keyword test over a device's alarm messages (case-insensitive substrings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Some message contains some keyword
    AnyOf(Vec<String>),
    /// Every keyword appears in at least one message
    AllOf(Vec<String>),
}

impl Predicate {
    fn keywords(&self) -> &[String] {
        match self {
            Predicate::AnyOf(k) | Predicate::AllOf(k) => k,
        }
    }

    /// `messages` must already be lower-cased
    fn test(&self, messages: &[String]) -> bool {
        let hit = |kw: &String| {
            let kw = kw.to_lowercase();
            messages.iter().any(|m| m.contains(&kw))
        };
        match self {
            Predicate::AnyOf(k) => k.iter().any(hit),
            Predicate::AllOf(k) => k.iter().all(hit),
        }
    }
}

/// Named fault pattern with a base confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub category: String,
    pub label: String,
    pub predicate: Predicate,
    pub base_score: f64,
}

impl Signature {
    fn new(category: &str, label: &str, predicate: Predicate, base_score: f64) -> Self {
        Self {
            category: category.to_string(),
            label: label.to_string(),
            predicate,
            base_score,
        }
    }

    /// Check that the signature can be evaluated
    pub fn validate(&self) -> Result<(), ScoringError> {
        let keywords = self.predicate.keywords();
        if keywords.is_empty() {
            return Err(ScoringError::EmptyPredicate(self.category.clone()));
        }
        if keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ScoringError::BlankKeyword(self.category.clone()));
        }
        if !(0.0..=1.0).contains(&self.base_score) {
            return Err(ScoringError::InvalidBaseScore {
                category: self.category.clone(),
                score: self.base_score,
            });
        }
        Ok(())
    }

    /// Whether the signature matches a device's lower-cased alarm messages
    ///
    /// Assumes the signature passed `validate`.
    pub fn matches(&self, messages: &[String]) -> bool {
        self.predicate.test(messages)
    }
}

/// Drop signatures that cannot be evaluated, warning once per entry
pub fn validated(table: Vec<Signature>) -> Vec<Signature> {
    table
        .into_iter()
        .filter(|signature| match signature.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignoring signature: {}", e);
                false
            }
        })
        .collect()
}

fn any_of(keywords: &[&str]) -> Predicate {
    Predicate::AnyOf(keywords.iter().map(|k| k.to_string()).collect())
}

fn all_of(keywords: &[&str]) -> Predicate {
    Predicate::AllOf(keywords.iter().map(|k| k.to_string()).collect())
}

/// Default signature table, in evaluation order
pub fn builtin_signatures() -> Vec<Signature> {
    vec![
        Signature::new(
            "Hardware/Critical_Multi_Fail",
            "Compound hardware failure",
            all_of(&["power supply", "fan"]),
            1.0,
        ),
        Signature::new(
            "Hardware/Physical",
            "Hardware failure (power/device)",
            any_of(&["power supply", "device down"]),
            0.95,
        ),
        Signature::new(
            "Network/Link",
            "Physical link/interface failure",
            any_of(&["interface down", "connection lost", "heartbeat loss"]),
            0.90,
        ),
        Signature::new("Hardware/Fan", "Cooling fan failure", any_of(&["fan fail"]), 0.70),
        Signature::new(
            "Config/Software",
            "Misconfiguration/protocol failure",
            any_of(&["bgp", "ospf", "config"]),
            0.60,
        ),
        Signature::new(
            "Resource/Capacity",
            "Resource exhaustion (CPU/memory)",
            any_of(&["cpu", "memory", "high"]),
            0.50,
        ),
    ]
}

/// Load a scope's signature override, if one exists
///
/// Invalid entries are dropped with a warning.
pub fn load_signature_table(config_dir: &Path) -> Result<Option<Vec<Signature>>, ScoringError> {
    let path = config_dir.join(SIGNATURE_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let text = std::fs::read_to_string(&path).map_err(|e| ScoringError::Load(e.to_string()))?;
    let table: Vec<Signature> =
        serde_json::from_str(&text).map_err(|e| ScoringError::Load(e.to_string()))?;
    let table = validated(table);

    info!("Loaded {} signatures from {}", table.len(), path.display());
    Ok(Some(table))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(msgs: &[&str]) -> Vec<String> {
        msgs.iter().map(|m| m.to_lowercase()).collect()
    }

    #[test]
    fn test_builtin_table_order() {
        let table = builtin_signatures();
        assert_eq!(table.len(), 6);
        assert_eq!(table[0].category, "Hardware/Critical_Multi_Fail");
        assert_eq!(table[5].category, "Resource/Capacity");
        assert!(table.iter().all(|s| s.validate().is_ok()));
    }

    #[test]
    fn test_all_of_needs_every_keyword() {
        let multi = &builtin_signatures()[0];
        assert!(multi.matches(&lower(&["Power Supply 1 Failed", "Fan Fail"])));
        assert!(!multi.matches(&lower(&["Power Supply 1 Failed"])));
    }

    #[test]
    fn test_any_of_case_insensitive() {
        let link = &builtin_signatures()[2];
        assert!(link.matches(&lower(&["Interface DOWN on Gi0/1"])));
        assert!(!link.matches(&lower(&["Uplink Down"])));
    }

    #[test]
    fn test_malformed_signatures_rejected() {
        let empty = Signature::new("Broken/Empty", "x", Predicate::AnyOf(vec![]), 0.5);
        assert_eq!(
            empty.validate(),
            Err(ScoringError::EmptyPredicate("Broken/Empty".to_string()))
        );

        let blank = Signature::new("Broken/Blank", "x", any_of(&["  "]), 0.5);
        assert!(matches!(blank.validate(), Err(ScoringError::BlankKeyword(_))));

        let score = Signature::new("Broken/Score", "x", any_of(&["cpu"]), 1.5);
        assert!(matches!(score.validate(), Err(ScoringError::InvalidBaseScore { .. })));

        let nan = Signature::new("Broken/NaN", "x", any_of(&["cpu"]), f64::NAN);
        assert!(nan.validate().is_err());

        let mut table = vec![empty, blank, score, nan];
        table.extend(builtin_signatures());
        let kept = validated(table);
        assert_eq!(kept, builtin_signatures());
    }

    #[test]
    fn test_predicate_json_shape() {
        let json = r#"{"category":"C","label":"L","predicate":{"all_of":["a","b"]},"base_score":0.4}"#;
        let sig: Signature = serde_json::from_str(json).unwrap();
        assert_eq!(sig.predicate, all_of(&["a", "b"]));
    }

    #[test]
    fn test_load_fixture_override() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures/tenants/B/networks/branch/configs");
        let table = load_signature_table(&dir).unwrap().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[2].category, "Security/Policy");
    }

    #[test]
    fn test_missing_override_is_none() {
        assert_eq!(load_signature_table(Path::new("/no/such/dir")).unwrap(), None);
    }
}
