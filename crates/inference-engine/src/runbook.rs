//! Remediation runbooks keyed by SOP

use crate::engine::SopKey;
use serde::Serialize;

/// A remediation procedure
#[derive(Debug, Clone, Serialize)]
pub struct Runbook {
    pub key: SopKey,
    pub title: &'static str,
    pub steps: &'static [&'static str],
}

static WAN_FAILURE: Runbook = Runbook {
    key: SopKey::WanFailure,
    title: "WAN circuit outage",
    steps: &[
        "Confirm physical link state on the WAN edge router interfaces",
        "Check BGP neighbor state and received prefixes",
        "Open a ticket with the carrier including circuit ID and outage start time",
        "Activate backup circuit or LTE failover if provisioned",
    ],
};

static FW_HA_WARNING: Runbook = Runbook {
    key: SopKey::FwHaWarning,
    title: "Firewall HA member failure (service protected)",
    steps: &[
        "Verify the standby member has taken the active role and sessions are synchronized",
        "Collect logs and hardware status from the failed member",
        "Schedule RMA or power-supply replacement within the maintenance window",
        "Restore HA pairing and confirm heartbeat after repair",
    ],
};

static L2_SILENT_FAILURE: Runbook = Runbook {
    key: SopKey::L2SilentFailure,
    title: "Silent access-switch failure",
    steps: &[
        "Ping the switch management address from the core switch",
        "Check the core switch uplink port toward the silent switch for errors or err-disable",
        "Dispatch on-site staff to check power and console output",
        "Power-cycle or replace the switch; confirm downstream devices recover",
    ],
};

static DEFAULT: Runbook = Runbook {
    key: SopKey::Default,
    title: "General incident triage",
    steps: &[
        "Review alarms on the identified device and its immediate neighbors",
        "Check recent configuration changes",
        "Escalate to the on-call network engineer if service impact is confirmed",
    ],
};

/// Runbook for a SOP key
pub fn runbook(key: SopKey) -> &'static Runbook {
    match key {
        SopKey::WanFailure => &WAN_FAILURE,
        SopKey::FwHaWarning => &FW_HA_WARNING,
        SopKey::L2SilentFailure => &L2_SILENT_FAILURE,
        SopKey::Default => &DEFAULT,
    }
}
