//! Service configuration
//!
//! Layered from defaults, an optional TOML file and `RCA__`-prefixed
//! environment variables (e.g. `RCA__BIND_ADDR`, `RCA__RATE_LIMIT__BURST_SIZE`).

use crate::error::ApiError;
use crate::rate_limit::RateLimitConfig;
use inference_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use signature_scoring::ScoringConfig;
use status_board::BoardConfig;

/// Default configuration file, looked up relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "rca-service.toml";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address
    pub bind_addr: String,
    /// Directory holding `tenants/`
    pub data_root: String,
    /// Max tracing level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    pub rate_limit: RateLimitConfig,
    pub engine: EngineConfig,
    pub scoring: ScoringConfig,
    pub board: BoardConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            data_root: ".".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            rate_limit: RateLimitConfig::default(),
            engine: EngineConfig::default(),
            scoring: ScoringConfig::default(),
            board: BoardConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration; a missing file is not an error
    pub fn load(path: Option<&str>) -> Result<Self, ApiError> {
        let file = path.unwrap_or(DEFAULT_CONFIG_FILE);

        config::Config::builder()
            .add_source(config::File::with_name(file).required(path.is_some()))
            .add_source(config::Environment::with_prefix("RCA").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ApiError::Config(e.to_string()))
    }
}
