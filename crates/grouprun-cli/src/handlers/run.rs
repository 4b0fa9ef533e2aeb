//! `grouprun run`: launch one command and mirror its exit status.

use std::sync::Arc;

use anyhow::anyhow;
use grouprun_core::RunError;
use grouprun_runtime::{FileKillRegistry, Launcher, sweep_orphaned_groups};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bootstrap::CliConfig;
use crate::commands::RunArgs;

/// Exit code for failures of grouprun itself rather than of the child.
pub const LAUNCHER_FAILURE_CODE: i32 = 1;

/// Run the command described by `args` and return the exit code to use.
///
/// Leftovers of earlier crashed runs are swept before starting. A sweep
/// failure is logged and does not prevent the run.
pub async fn execute(
    config: &CliConfig,
    args: &RunArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<i32> {
    let spec = args.to_spec().ok_or_else(|| anyhow!("no command given"))?;
    let registry_dir = config.registry_dir()?;

    match sweep_orphaned_groups(&registry_dir) {
        Ok(report) => debug!(?report, "Pre-run sweep finished"),
        Err(e) => warn!(dir = %registry_dir.display(), error = %e, "Pre-run sweep failed"),
    }

    let launcher = Launcher::with_registrar(Arc::new(FileKillRegistry::new(registry_dir)));
    let result = launcher.run(&spec, cancel).await;

    if let Err(e) = &result {
        if !e.is_child_failure() {
            eprintln!("grouprun: {e}");
        }
    }
    Ok(exit_code(&result))
}

/// Exit code mirroring a run result, shell style.
pub const fn exit_code(result: &Result<(), RunError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(RunError::Exit { code }) => *code,
        Err(RunError::Signaled { signal }) => 128 + *signal,
        Err(_) => LAUNCHER_FAILURE_CODE,
    }
}
