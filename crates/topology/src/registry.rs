//! Tenant/network registry
//!
//! Layout on disk:
//!   `<root>/tenants/<TENANT>/networks/<NETWORK>/topology.json`
//!   `<root>/tenants/<TENANT>/networks/<NETWORK>/configs/`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Tenants reported when no tenant directory exists
const FALLBACK_TENANTS: [&str; 2] = ["A", "B"];

/// Network reported when a tenant has no network directory
const FALLBACK_NETWORK: &str = "default";

/// Resolved paths for one (tenant, network) scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopePaths {
    pub tenant_id: String,
    pub network_id: String,
    pub topology_path: PathBuf,
    pub config_dir: PathBuf,
}

/// Directory-backed registry of tenants and their networks
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    /// Create a registry rooted at `root` (the directory holding `tenants/`)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn tenants_root(&self) -> PathBuf {
        self.root.join("tenants")
    }

    /// Known tenants, sorted
    pub fn list_tenants(&self) -> Vec<String> {
        let tenants = list_subdirs(&self.tenants_root());
        if tenants.is_empty() {
            FALLBACK_TENANTS.iter().map(|t| t.to_string()).collect()
        } else {
            tenants
        }
    }

    /// Networks of a tenant, sorted
    pub fn list_networks(&self, tenant_id: &str) -> Vec<String> {
        let networks = list_subdirs(&self.tenants_root().join(tenant_id).join("networks"));
        if networks.is_empty() {
            vec![FALLBACK_NETWORK.to_string()]
        } else {
            networks
        }
    }

    /// Resolve the paths of a scope (the files need not exist)
    pub fn paths(&self, tenant_id: &str, network_id: &str) -> ScopePaths {
        let base = self
            .tenants_root()
            .join(tenant_id)
            .join("networks")
            .join(network_id);

        ScopePaths {
            tenant_id: tenant_id.to_string(),
            network_id: network_id.to_string(),
            topology_path: base.join("topology.json"),
            config_dir: base.join("configs"),
        }
    }
}

/// Modification time of a file; the Unix epoch when it cannot be read
pub fn modified_time(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

fn list_subdirs(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    names
}
