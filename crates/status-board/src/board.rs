//! Status Board Implementation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Alarm count at which a scope leaves Good for Watch (default: 1)
    pub watch_threshold: usize,
    /// Alarm count at which a scope becomes Degraded (default: 5)
    pub degraded_threshold: usize,
    /// Alarm count at which a scope is Down (default: 15)
    pub down_threshold: usize,
    /// Nominal scan interval reported with deltas (minutes)
    pub delta_window_min: u32,
    /// Rows shown per health column
    pub max_rows_per_column: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            watch_threshold: 1,
            degraded_threshold: 5,
            down_threshold: 15,
            delta_window_min: 15,
            max_rows_per_column: 10,
        }
    }
}

/// Scope health, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Down,
    Degraded,
    Watch,
    Good,
}

impl Health {
    /// Column order on the board
    pub const ORDER: [Health; 4] = [Health::Down, Health::Degraded, Health::Watch, Health::Good];

    /// Health bucket for an alarm count
    pub fn from_alarm_count(count: usize, config: &BoardConfig) -> Self {
        if count >= config.down_threshold {
            Health::Down
        } else if count >= config.degraded_threshold {
            Health::Degraded
        } else if count >= config.watch_threshold {
            Health::Watch
        } else {
            Health::Good
        }
    }
}

/// Result of one scan of one scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSummary {
    pub tenant: String,
    pub network: String,
    pub health: Health,
    pub alarms: usize,
    /// Top-ranked candidate, if any
    pub suspected: Option<String>,
}

impl ScopeSummary {
    fn key(&self) -> String {
        format!("{}::{}", self.tenant, self.network)
    }
}

/// Change since the previous scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeDelta {
    pub alarms: i64,
    pub health_changed: bool,
    pub window_min: u32,
}

/// A scope as shown on the board
#[derive(Debug, Clone, Serialize)]
pub struct BoardRow {
    pub summary: ScopeSummary,
    /// `None` on the first scan or when nothing changed
    pub delta: Option<ScopeDelta>,
    pub prev_alarms: Option<usize>,
    pub prev_health: Option<Health>,
    pub maintenance: bool,
}

/// One health column
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub health: Health,
    /// Total scopes in this column, including hidden ones
    pub total: usize,
    pub rows: Vec<BoardRow>,
}

/// Rendered board
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub generated_at: DateTime<Utc>,
    pub previous_scan_at: Option<DateTime<Utc>>,
    pub columns: Vec<BoardColumn>,
}

impl Board {
    /// Column for a health bucket
    pub fn column(&self, health: Health) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| c.health == health)
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    alarms: usize,
    health: Health,
}

/// Board state keyed by (tenant, network)
pub struct StatusBoard {
    config: BoardConfig,
    previous: HashMap<String, Snapshot>,
    previous_at: Option<DateTime<Utc>>,
    maintenance: HashMap<String, bool>,
}

impl StatusBoard {
    /// Create a new board
    pub fn new(config: BoardConfig) -> Self {
        info!("Creating status board with config: {:?}", config);
        Self {
            config,
            previous: HashMap::new(),
            previous_at: None,
            maintenance: HashMap::new(),
        }
    }

    /// Board configuration
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Summarize a scan result
    pub fn summarize(&self, tenant: &str, network: &str, alarms: usize, suspected: Option<String>) -> ScopeSummary {
        ScopeSummary {
            tenant: tenant.to_string(),
            network: network.to_string(),
            health: Health::from_alarm_count(alarms, &self.config),
            alarms,
            suspected,
        }
    }

    /// Mark or clear a tenant as under maintenance
    pub fn set_maintenance(&mut self, tenant: &str, on: bool) {
        info!("Maintenance for {}: {}", tenant, on);
        self.maintenance.insert(tenant.to_string(), on);
    }

    /// Whether a tenant is under maintenance
    pub fn in_maintenance(&self, tenant: &str) -> bool {
        self.maintenance.get(tenant).copied().unwrap_or(false)
    }

    /// Build the board from this scan and remember it as the previous scan
    pub fn render(&mut self, summaries: Vec<ScopeSummary>) -> Board {
        let now = Utc::now();
        let previous_at = self.previous_at;

        let mut columns: Vec<BoardColumn> = Health::ORDER
            .iter()
            .map(|&health| BoardColumn {
                health,
                total: 0,
                rows: Vec::new(),
            })
            .collect();

        let mut next = HashMap::with_capacity(summaries.len());
        for summary in summaries {
            let key = summary.key();
            let prev = self.previous.get(&key);
            let delta = prev.and_then(|p| self.delta(p, &summary));

            next.insert(
                key,
                Snapshot {
                    alarms: summary.alarms,
                    health: summary.health,
                },
            );

            let row = BoardRow {
                maintenance: self.in_maintenance(&summary.tenant),
                prev_alarms: prev.map(|p| p.alarms),
                prev_health: prev.map(|p| p.health),
                delta,
                summary,
            };

            if let Some(column) = columns.iter_mut().find(|c| c.health == row.summary.health) {
                column.rows.push(row);
            }
        }

        for column in &mut columns {
            column.total = column.rows.len();
            column.rows.sort_by(|a, b| b.summary.alarms.cmp(&a.summary.alarms));
            column.rows.truncate(self.config.max_rows_per_column);
        }

        debug!("Rendered board with {} scopes", next.len());
        self.previous = next;
        self.previous_at = Some(now);

        Board {
            generated_at: now,
            previous_scan_at: previous_at,
            columns,
        }
    }

    fn delta(&self, prev: &Snapshot, current: &ScopeSummary) -> Option<ScopeDelta> {
        let alarms = current.alarms as i64 - prev.alarms as i64;
        let health_changed = prev.health != current.health;
        if alarms == 0 && !health_changed {
            return None;
        }
        Some(ScopeDelta {
            alarms,
            health_changed,
            window_min: self.config.delta_window_min,
        })
    }

    /// Forget previous scans and maintenance flags
    pub fn clear(&mut self) {
        self.previous.clear();
        self.previous_at = None;
        self.maintenance.clear();
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}
