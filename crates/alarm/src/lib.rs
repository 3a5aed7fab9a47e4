//! Device Alarms
//!
//! Alarm records as produced by a scenario generator or an external feed.
//! Alarms may reference devices absent from the topology.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Alarm errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AlarmError {
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),
}

/// Alarm severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AlarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Ok(Severity::Critical),
            "WARNING" => Ok(Severity::Warning),
            "INFO" => Ok(Severity::Info),
            _ => Err(AlarmError::UnknownSeverity(s.to_string())),
        }
    }
}

/// A single device alarm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub device_id: String,
    pub message: String,
    pub severity: Severity,
}

impl Alarm {
    /// Create a new alarm
    pub fn new(device_id: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            device_id: device_id.into(),
            message: message.into(),
            severity,
        }
    }

    /// Create a CRITICAL alarm
    pub fn critical(device_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(device_id, message, Severity::Critical)
    }

    /// Create a WARNING alarm
    pub fn warning(device_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(device_id, message, Severity::Warning)
    }

    /// Create an INFO alarm
    pub fn info(device_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(device_id, message, Severity::Info)
    }
}

/// Distinct device ids referenced by a set of alarms
pub fn alarmed_devices(alarms: &[Alarm]) -> HashSet<&str> {
    alarms.iter().map(|a| a.device_id.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_case_insensitive() {
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!(" Warning ".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("INFO".parse::<Severity>().unwrap(), Severity::Info);
        assert!("MAJOR".parse::<Severity>().is_err());
    }

    #[test]
    fn test_alarm_json_shape() {
        let alarm = Alarm::critical("AP_01", "Connection Lost");
        let json = serde_json::to_value(&alarm).unwrap();

        assert_eq!(json["device_id"], "AP_01");
        assert_eq!(json["severity"], "CRITICAL");

        let back: Alarm = serde_json::from_value(json).unwrap();
        assert_eq!(back, alarm);
    }

    #[test]
    fn test_alarmed_devices_dedup() {
        let alarms = vec![
            Alarm::warning("FW_01_PRIMARY", "Heartbeat Loss"),
            Alarm::critical("FW_01_PRIMARY", "System Crash"),
            Alarm::info("GHOST", "Unknown device"),
        ];
        let ids = alarmed_devices(&alarms);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("GHOST"));
    }
}
