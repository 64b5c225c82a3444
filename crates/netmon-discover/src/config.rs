//! Configuration for the netmon monitor.

use std::net::IpAddr;
use std::time::Duration;

use ipnet::IpNet;
use serde::Deserialize;

use crate::error::{DiscoverError, Result};

/// Top-level monitor configuration.
///
/// Loaded from an optional `netmon.toml` and `NETMON_` environment
/// variables, with command-line flags applied on top. Built once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Notification destination URL (e.g. `ntfy://netmon-alerts`). Empty disables notifications.
    #[serde(default)]
    pub notification: String,

    /// Scan target handed to nmap (CIDR notation, e.g. "192.168.1.0/24").
    #[serde(default = "default_subnet")]
    pub subnet: String,

    /// Minutes between scheduled scans.
    #[serde(default = "default_minutes")]
    pub minutes: u64,

    /// Path of the persisted host map.
    #[serde(default = "default_results")]
    pub results: String,

    /// Path to the nmap binary (default: "nmap").
    #[serde(default = "default_nmap_path")]
    pub nmap_path: String,
}

fn default_subnet() -> String {
    "192.168.1.0/24".to_string()
}

/// One year. Longer periods are almost certainly a typo.
pub const MAX_MINUTES: u64 = 365 * 24 * 60;

fn default_minutes() -> u64 {
    15
}

fn default_results() -> String {
    "results.json".to_string()
}

fn default_nmap_path() -> String {
    "nmap".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            notification: String::new(),
            subnet: default_subnet(),
            minutes: default_minutes(),
            results: default_results(),
            nmap_path: default_nmap_path(),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.minutes == 0 {
            return Err(DiscoverError::Config(
                "scan interval must be at least 1 minute".to_string(),
            ));
        }
        if self.minutes > MAX_MINUTES {
            return Err(DiscoverError::Config(format!(
                "scan interval must be at most {MAX_MINUTES} minutes"
            )));
        }
        if self.subnet.trim().is_empty() {
            return Err(DiscoverError::Config("subnet must not be empty".to_string()));
        }
        if self.results.trim().is_empty() {
            return Err(DiscoverError::Config(
                "results path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.minutes.saturating_mul(60))
    }

    /// The notification scheme, safe to print. Never the full URL.
    pub fn notification_service(&self) -> &str {
        self.notification
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or("")
    }

    /// Whether the subnet is a CIDR block or a single address. nmap accepts
    /// more (ranges, wildcards, hostnames), so anything else is only suspicious.
    pub fn subnet_is_cidr(&self) -> bool {
        let subnet = self.subnet.trim();
        subnet.parse::<IpNet>().is_ok() || subnet.parse::<IpAddr>().is_ok()
    }
}
