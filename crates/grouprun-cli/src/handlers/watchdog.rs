//! `grouprun watchdog`: sweep continuously until cancelled.

use std::time::Duration;

use grouprun_runtime::{RegistryWatchdog, SweepReport};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bootstrap::CliConfig;

/// Sweep every `interval` until `cancel` fires and return the totals.
pub async fn execute(
    config: &CliConfig,
    interval: Duration,
    cancel: CancellationToken,
) -> anyhow::Result<SweepReport> {
    let dir = config.registry_dir()?;
    info!(dir = %dir.display(), ?interval, "Watching kill registry");

    Ok(RegistryWatchdog::new(dir, interval, cancel).run().await)
}
