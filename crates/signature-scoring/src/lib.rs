//! Signature Scoring Engine
//!
//! Ranks probable root causes:
//! - Per-device scoring against an ordered table of fault signatures
//! - Silent-failure detection from correlated downstream link loss
//! - Suppression of downstream victims below the actionable threshold

mod cache;
mod candidate;
mod config;
mod engine;
mod signature;

pub use cache::SignatureCache;
pub use candidate::{Candidate, ScoreBand};
pub use config::ScoringConfig;
pub use engine::SignatureScoringEngine;
pub use signature::{
    builtin_signatures, load_signature_table, validated, Predicate, Signature, SIGNATURE_FILE,
};

use thiserror::Error;

/// Scoring errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    /// Predicate has no keywords to test
    #[error("Signature {0} has an empty predicate")]
    EmptyPredicate(String),

    /// Predicate contains a blank keyword
    #[error("Signature {0} has a blank keyword")]
    BlankKeyword(String),

    /// Base score outside [0, 1]
    #[error("Signature {category} base score {score} is outside [0, 1]")]
    InvalidBaseScore { category: String, score: f64 },

    /// Signature table could not be read
    #[error("Failed to load signature table: {0}")]
    Load(String),

    /// Cache lock was poisoned
    #[error("Signature cache lock error: {0}")]
    Lock(String),
}
