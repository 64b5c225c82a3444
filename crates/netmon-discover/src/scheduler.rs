//! Scan scheduling engine.
//!
//! One cycle runs at startup, then one per period boundary measured from
//! that start. Cycles run strictly one after another on the calling task; a
//! boundary that passes while a cycle is still running is skipped, and the
//! next cycle waits for the following boundary.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

use netmon_core::{merge, CycleKind, CycleReport, HostDiff, NotificationEvent};
use netmon_state::StateStore;

use crate::error::{DiscoverError, Result};
use crate::notify::Notifier;
use crate::reduce::reduce_scan;
use crate::scanner::HostScanner;

/// Drives scan -> diff -> notify -> merge -> persist for one target.
pub struct ScanScheduler<S, N, St> {
    scanner: S,
    notifier: N,
    store: St,
    target: String,
    period: Duration,
}

impl<S, N, St> ScanScheduler<S, N, St>
where
    S: HostScanner,
    N: Notifier,
    St: StateStore,
{
    pub fn new(scanner: S, notifier: N, store: St, target: &str, period: Duration) -> Self {
        Self {
            scanner,
            notifier,
            store,
            target: target.to_string(),
            period,
        }
    }

    /// Run cycles until `shutdown` resolves or a fatal error occurs.
    ///
    /// Scan and persist failures abandon the current cycle and wait for the
    /// next tick. Corrupt state stops the loop. `shutdown` is honoured both
    /// while idle and in the middle of a cycle.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let origin = Instant::now();
        let mut next_run = origin;

        tracing::info!(
            target = %self.target,
            period_secs = self.period.as_secs(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                () = sleep_until(next_run) => {}
                () = &mut shutdown => return Ok(()),
            }

            let outcome = tokio::select! {
                outcome = self.run_cycle() => outcome,
                () = &mut shutdown => {
                    tracing::warn!(target = %self.target, "Shutdown requested mid-cycle");
                    return Ok(());
                }
            };

            next_run = next_boundary(origin, self.period, Instant::now());

            match outcome {
                Ok(_) => {}
                Err(e) if e.is_fatal() => {
                    tracing::error!(target = %self.target, error = %e, "Stopping monitor");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(
                        target = %self.target,
                        error = %e,
                        "Scan cycle failed, retrying at next tick"
                    );
                }
            }
        }
    }

    /// Execute a single cycle.
    ///
    /// Without prior state the observation becomes the baseline and nobody is
    /// notified. Otherwise each newly seen MAC is notified independently and
    /// the merged map replaces the stored one, regardless of delivery.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let cycle_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        let scan = self.scanner.scan(&self.target).await?;
        let observed = reduce_scan(&scan.nmap_run);

        tracing::debug!(
            cycle_id = %cycle_id,
            scan_id = %scan.scan_id,
            target = %scan.target,
            scan_ms = scan.duration.as_millis() as u64,
            hosts = observed.len(),
            "Scan reduced"
        );

        if self.store.is_first_run() {
            self.store.save(&observed).map_err(DiscoverError::Persist)?;

            tracing::info!(
                cycle_id = %cycle_id,
                hosts = observed.len(),
                "First run, found {} hosts",
                observed.len()
            );

            return Ok(CycleReport {
                cycle_id,
                kind: CycleKind::Bootstrap,
                target: self.target.clone(),
                started_at,
                observed: observed.len(),
                new_hosts: 0,
                moved_hosts: 0,
                notified: 0,
                notify_failed: 0,
                known_total: observed.len(),
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        let known = self.store.load().map_err(DiscoverError::StateCorrupt)?;
        let diff = HostDiff::compute(&known, &observed);
        if diff.is_empty() {
            tracing::debug!(cycle_id = %cycle_id, "No new or moved devices");
        }

        for moved in &diff.moved_hosts {
            tracing::info!(
                mac = %moved.mac,
                from = %moved.from,
                to = %moved.to,
                "Known device changed IP"
            );
        }

        let mut notified = 0;
        let mut notify_failed = 0;
        for host in &diff.new_hosts {
            let event = NotificationEvent::new_device(host);
            tracing::info!(mac = %event.mac, ip = %event.ip, "{}", event.message);

            match self.notifier.notify(&event.title, &event.message).await {
                Ok(()) => notified += 1,
                Err(e) => {
                    notify_failed += 1;
                    tracing::warn!(mac = %event.mac, error = %e, "Notification not delivered");
                }
            }
        }

        let merged = merge(known, &observed);
        self.store.save(&merged).map_err(DiscoverError::Persist)?;

        let report = CycleReport {
            cycle_id,
            kind: CycleKind::SteadyState,
            target: self.target.clone(),
            started_at,
            observed: observed.len(),
            new_hosts: diff.new_hosts.len(),
            moved_hosts: diff.moved_hosts.len(),
            notified,
            notify_failed,
            known_total: merged.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            cycle_id = %cycle_id,
            target = %self.target,
            observed = report.observed,
            new = report.new_hosts,
            moved = report.moved_hosts,
            notify_failed = report.notify_failed,
            known = report.known_total,
            duration_ms = report.duration_ms,
            "Scan cycle complete"
        );

        Ok(report)
    }
}

/// First boundary `origin + k * period` strictly after `now`.
fn next_boundary(origin: Instant, period: Duration, now: Instant) -> Instant {
    let elapsed = now.saturating_duration_since(origin).as_nanos();
    let period_nanos = period.as_nanos().max(1);
    let into_period = u64::try_from(elapsed % period_nanos).unwrap_or(0);
    now + (period - Duration::from_nanos(into_period))
}
