//! Per-scope signature table cache

use crate::signature::{builtin_signatures, load_signature_table, Signature, SIGNATURE_FILE};
use crate::ScoringError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use tracing::{debug, warn};

struct CachedTable {
    modified: SystemTime,
    table: Arc<[Signature]>,
}

/// Validated signature tables keyed by scope config directory
///
/// A table is reloaded when its file's modification time changes. Scopes
/// without an override share the built-in table and are never cached.
pub struct SignatureCache {
    builtin: Arc<[Signature]>,
    cache: RwLock<HashMap<PathBuf, CachedTable>>,
}

impl SignatureCache {
    pub fn new() -> Self {
        Self {
            builtin: builtin_signatures().into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Built-in table
    pub fn builtin(&self) -> Arc<[Signature]> {
        Arc::clone(&self.builtin)
    }

    /// Table for a scope's config directory
    ///
    /// An unreadable override falls back to the built-in table, and the
    /// fallback is cached until the file changes so the warning is logged once.
    pub fn get(&self, config_dir: &Path) -> Result<Arc<[Signature]>, ScoringError> {
        let path = config_dir.join(SIGNATURE_FILE);
        let Ok(modified) = std::fs::metadata(&path).and_then(|m| m.modified()) else {
            self.cache
                .write()
                .map_err(|e| ScoringError::Lock(e.to_string()))?
                .remove(config_dir);
            return Ok(self.builtin());
        };

        {
            let cache = self
                .cache
                .read()
                .map_err(|e| ScoringError::Lock(e.to_string()))?;
            if let Some(entry) = cache.get(config_dir) {
                if entry.modified == modified {
                    return Ok(Arc::clone(&entry.table));
                }
            }
        }

        let table: Arc<[Signature]> = match load_signature_table(config_dir) {
            Ok(Some(table)) => table.into(),
            Ok(None) => self.builtin(),
            Err(e) => {
                warn!("Falling back to built-in signatures for {}: {}", path.display(), e);
                self.builtin()
            }
        };
        debug!("Cached {} signatures for {}", table.len(), config_dir.display());

        self.cache
            .write()
            .map_err(|e| ScoringError::Lock(e.to_string()))?
            .insert(
                config_dir.to_path_buf(),
                CachedTable {
                    modified,
                    table: Arc::clone(&table),
                },
            );
        Ok(table)
    }

    /// Number of cached override tables
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::new()
    }
}
