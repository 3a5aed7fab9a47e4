//! Network Topology Model
//!
//! Provides the device hierarchy consumed by the root-cause engines:
//! - Node records (layer, type, parent, redundancy group, metadata)
//! - Read-only graph queries (lookup, first-match search, children, peers)
//! - Tolerant JSON loading
//! - Tenant/network registry and an mtime-keyed topology cache

mod graph;
mod loader;
mod node;
mod registry;
mod store;

pub use graph::{NodeFilter, TopologyGraph};
pub use loader::{load_from_path, parse_document};
pub use node::{Node, NodeSpec, DEFAULT_LAYER, UNKNOWN_TYPE};
pub use registry::{Registry, ScopePaths};
pub use store::TopologyStore;

use thiserror::Error;

/// Topology errors
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Document could not be read
    #[error("Failed to read topology document {path}: {reason}")]
    Io { path: String, reason: String },

    /// Document is not valid topology JSON
    #[error("Invalid topology document: {0}")]
    Parse(String),

    /// Cache lock was poisoned
    #[error("Topology cache lock error: {0}")]
    Lock(String),
}
