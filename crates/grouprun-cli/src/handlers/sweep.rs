//! `grouprun sweep`: one recovery pass over the kill registry.

use anyhow::Context;
use grouprun_runtime::{SweepReport, sweep_orphaned_groups};

use crate::bootstrap::CliConfig;

pub fn execute(config: &CliConfig) -> anyhow::Result<SweepReport> {
    let dir = config.registry_dir()?;
    sweep_orphaned_groups(&dir)
        .with_context(|| format!("failed to sweep kill registry at {}", dir.display()))
}
