//! Values produced by a monitoring cycle.
//!
//! A `NotificationEvent` is built per newly seen host and handed to the
//! notification transport. A `CycleReport` summarizes one completed cycle
//! for logs and for `--once` output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::HostRecord;

/// Title attached to every notification.
pub const NOTIFICATION_TITLE: &str = "Net-Mon";

/// An alert for a single host seen for the first time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEvent {
    pub mac: String,
    pub ip: String,
    pub title: String,
    pub message: String,
    pub detected_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new_device(host: &HostRecord) -> Self {
        Self {
            mac: host.mac.clone(),
            ip: host.ip.clone(),
            title: NOTIFICATION_TITLE.to_string(),
            message: format!("New device {} on IP: {}", host.mac, host.ip),
            detected_at: Utc::now(),
        }
    }
}

/// Which branch of the cycle ran.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CycleKind {
    /// No prior state: the observation was stored as the baseline.
    Bootstrap,
    /// Observation diffed against prior state, new hosts notified.
    SteadyState,
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub kind: CycleKind,
    pub target: String,
    pub started_at: DateTime<Utc>,
    /// Hosts with a resolvable MAC in this scan.
    pub observed: usize,
    pub new_hosts: usize,
    pub moved_hosts: usize,
    pub notified: usize,
    pub notify_failed: usize,
    /// Size of the persisted map after this cycle.
    pub known_total: usize,
    pub duration_ms: u64,
}
