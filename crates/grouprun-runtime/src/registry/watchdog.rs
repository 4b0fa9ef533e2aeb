//! Periodic recovery of orphaned kill actions.
//!
//! The watchdog is the forced-kill tier: a launcher only ever sends the
//! cooperative interrupt, and if its own process dies before releasing a
//! registration, the next sweep here delivers the recorded `SIGKILL`.

use std::path::PathBuf;
use std::time::Duration;

use async_stream::stream;
use futures_util::Stream;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::sweep::{SweepReport, sweep_orphaned_groups};

/// Continuous sweeper over a registry directory.
///
/// Sweeps at a fixed interval and yields only the sweeps that changed
/// something, reducing event noise.
pub struct RegistryWatchdog {
    dir: PathBuf,
    interval: Duration,
    cancel_token: CancellationToken,
}

impl RegistryWatchdog {
    /// Create a new watchdog.
    ///
    /// # Arguments
    ///
    /// * `dir` - Registry directory to sweep
    /// * `sweep_interval` - How often to sweep (e.g., 1 second)
    /// * `cancel_token` - Token to signal watchdog shutdown
    pub fn new(
        dir: impl Into<PathBuf>,
        sweep_interval: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            dir: dir.into(),
            interval: sweep_interval,
            cancel_token,
        }
    }

    /// Start sweeping and return a stream of non-empty sweep reports.
    ///
    /// Completes when the cancellation token is triggered. A failing sweep is
    /// logged and retried on the next tick.
    pub fn watch(self) -> impl Stream<Item = SweepReport> {
        let dir = self.dir;
        let cancel_token = self.cancel_token;
        let sweep_interval = self.interval;

        stream! {
            let mut ticker = interval(sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!(dir = %dir.display(), "Starting registry watchdog");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match sweep_orphaned_groups(&dir) {
                            Ok(report) if !report.is_empty() => {
                                yield report;
                            }
                            Ok(_) => {}
                            Err(e) => warn!(dir = %dir.display(), error = %e, "Registry sweep failed"),
                        }
                    }
                    () = cancel_token.cancelled() => {
                        debug!(dir = %dir.display(), "Registry watchdog cancelled");
                        break;
                    }
                }
            }
        }
    }

    /// Sweep until cancelled and return the accumulated report.
    pub async fn run(self) -> SweepReport {
        use futures_util::StreamExt;

        let mut total = SweepReport::default();
        let mut reports = Box::pin(self.watch());
        while let Some(report) = reports.next().await {
            total += report;
        }
        total
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::process::test_utils::reaped_pid;
    use crate::registry::io::{RegistryEntry, write_entry};
    use futures_util::StreamExt;
    use grouprun_core::{KillSignal, ProcessGroup};
    use tempfile::TempDir;

    fn stale_entry() -> RegistryEntry {
        RegistryEntry {
            owner_pid: reaped_pid(),
            target: ProcessGroup::new(reaped_pid()),
            signal: KillSignal::Kill,
            label: "stale".to_string(),
        }
    }

    #[tokio::test]
    async fn watchdog_yields_report_for_stale_entry() {
        let dir = TempDir::new().unwrap();
        write_entry(dir.path(), "stale", &stale_entry()).unwrap();

        let cancel_token = CancellationToken::new();
        let watchdog =
            RegistryWatchdog::new(dir.path(), Duration::from_millis(10), cancel_token.clone());
        let mut reports = Box::pin(watchdog.watch());

        let first = tokio::time::timeout(Duration::from_secs(2), reports.next())
            .await
            .expect("watchdog did not report");
        cancel_token.cancel();

        let report = first.expect("stream ended early");
        assert_eq!(report.removed, 1);
    }

    #[tokio::test]
    async fn run_completes_on_cancellation() {
        let dir = TempDir::new().unwrap();
        let cancel_token = CancellationToken::new();
        let watchdog =
            RegistryWatchdog::new(dir.path(), Duration::from_millis(10), cancel_token.clone());

        let handle = tokio::spawn(watchdog.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel_token.cancel();

        let total = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("watchdog did not stop")
            .expect("watchdog panicked");
        assert!(total.is_empty());
    }
}
