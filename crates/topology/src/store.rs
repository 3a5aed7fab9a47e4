//! Per-scope topology cache

use crate::graph::TopologyGraph;
use crate::loader::load_from_path;
use crate::registry::{modified_time, Registry, ScopePaths};
use crate::TopologyError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use tracing::{debug, info};

struct CachedTopology {
    modified: SystemTime,
    graph: Arc<TopologyGraph>,
}

/// Topology cache keyed by (tenant, network)
///
/// A scope is reloaded when its document's modification time changes. Each
/// reload publishes a fresh `Arc`, so callers holding the previous graph keep
/// a consistent view.
pub struct TopologyStore {
    registry: Registry,
    cache: RwLock<HashMap<(String, String), CachedTopology>>,
}

impl TopologyStore {
    /// Create a store over a registry
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve the paths of a scope
    pub fn paths(&self, tenant_id: &str, network_id: &str) -> ScopePaths {
        self.registry.paths(tenant_id, network_id)
    }

    /// Modification time of the scope's topology document
    pub fn last_modified(&self, tenant_id: &str, network_id: &str) -> SystemTime {
        modified_time(&self.paths(tenant_id, network_id).topology_path)
    }

    /// Current topology of a scope, reloading when the document changed
    ///
    /// A scope without a document yields an empty topology and is not cached.
    pub fn get(&self, tenant_id: &str, network_id: &str) -> Result<Arc<TopologyGraph>, TopologyError> {
        let key = (tenant_id.to_string(), network_id.to_string());
        let modified = self.last_modified(tenant_id, network_id);

        if modified == SystemTime::UNIX_EPOCH {
            debug!("No topology document for {}/{}", tenant_id, network_id);
            self.cache
                .write()
                .map_err(|e| TopologyError::Lock(e.to_string()))?
                .remove(&key);
            return Ok(Arc::new(TopologyGraph::new()));
        }

        {
            let cache = self
                .cache
                .read()
                .map_err(|e| TopologyError::Lock(e.to_string()))?;
            if let Some(entry) = cache.get(&key) {
                if entry.modified == modified {
                    return Ok(Arc::clone(&entry.graph));
                }
            }
        }

        let paths = self.paths(tenant_id, network_id);
        let graph = Arc::new(load_from_path(&paths.topology_path));
        info!(
            "Loaded topology for {}/{} ({} nodes)",
            tenant_id,
            network_id,
            graph.len()
        );

        let mut cache = self
            .cache
            .write()
            .map_err(|e| TopologyError::Lock(e.to_string()))?;
        cache.insert(
            key,
            CachedTopology {
                modified,
                graph: Arc::clone(&graph),
            },
        );
        Ok(graph)
    }

    /// Number of cached scopes
    pub fn cached_scopes(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Drop every cached scope
    pub fn invalidate_all(&self) -> Result<(), TopologyError> {
        self.cache
            .write()
            .map_err(|e| TopologyError::Lock(e.to_string()))?
            .clear();
        Ok(())
    }
}
