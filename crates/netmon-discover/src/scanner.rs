//! Nmap process wrapper.
//!
//! Executes an nmap ping scan as a child process via `tokio::process::Command`
//! and parses the XML output into typed Rust structs.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use uuid::Uuid;

use crate::error::{DiscoverError, Result};
use crate::nmap_xml::{self, NmapRun};

/// Result of a single scan execution.
pub struct ScanResult {
    /// Unique ID for this scan run.
    pub scan_id: Uuid,
    /// The target CIDR or host expression.
    pub target: String,
    /// Parsed nmap XML output.
    pub nmap_run: NmapRun,
    /// Wall-clock duration of the scan.
    pub duration: Duration,
}

/// Anything that can discover the active hosts of a target.
#[async_trait]
pub trait HostScanner: Send + Sync {
    async fn scan(&self, target: &str) -> Result<ScanResult>;
}

/// Wrapper around the nmap binary.
pub struct NmapScanner {
    nmap_path: String,
}

impl NmapScanner {
    /// `-sn` skips port scanning; on a local segment nmap resolves each
    /// responder's MAC from the ARP exchange.
    const PING_SCAN_FLAGS: [&'static str; 1] = ["-sn"];

    pub fn new(nmap_path: &str) -> Self {
        Self {
            nmap_path: nmap_path.to_string(),
        }
    }

    /// Verify nmap is installed and accessible.
    pub async fn verify_installation(&self) -> Result<String> {
        let output = Command::new(&self.nmap_path)
            .arg("--version")
            .output()
            .await
            .map_err(|_| DiscoverError::NmapNotFound {
                path: self.nmap_path.clone(),
            })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl HostScanner for NmapScanner {
    /// Ping-scan the target with `-oX -` so XML lands on stdout. The child is
    /// killed if this future is dropped, e.g. on shutdown mid-scan.
    async fn scan(&self, target: &str) -> Result<ScanResult> {
        let scan_id = Uuid::new_v4();
        let start = Instant::now();

        tracing::debug!(scan_id = %scan_id, target = %target, "Starting nmap scan");

        let output = Command::new(&self.nmap_path)
            .args(Self::PING_SCAN_FLAGS)
            .arg("-oX")
            .arg("-")
            .arg("--noninteractive")
            .arg(target)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DiscoverError::NmapNotFound {
                path: format!("{}: {e}", self.nmap_path),
            })?;

        let duration = start.elapsed();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(DiscoverError::NmapFailed {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let nmap_run = nmap_xml::parse_nmap_xml(&output.stdout)?;
        let host_count = nmap_run.hosts.iter().filter(|h| h.is_up()).count();

        tracing::debug!(
            scan_id = %scan_id,
            target = %target,
            hosts_up = host_count,
            duration_ms = duration.as_millis(),
            "Nmap scan complete"
        );

        Ok(ScanResult {
            scan_id,
            target: target.to_string(),
            nmap_run,
            duration,
        })
    }
}
