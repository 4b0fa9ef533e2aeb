//! Composition helpers: configuration, logging and shutdown wiring.

use std::path::PathBuf;

use anyhow::Context;
use grouprun_core::{registry_dir, registry_dir_in};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::parser::Cli;

/// Exit status used when a second Ctrl-C abandons a run.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit data root; the platform default is used when `None`.
    pub data_dir: Option<PathBuf>,
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            data_dir: cli.data_dir.clone(),
        }
    }

    /// Directory of the kill registry this invocation reads and writes.
    pub fn registry_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.data_dir {
            Some(root) => Ok(registry_dir_in(root)),
            None => registry_dir().context("failed to resolve the kill registry directory"),
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so that a child's stdout passes through untouched.
/// `--verbose` forces `debug`; otherwise `RUST_LOG` applies, defaulting to
/// `info`.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Token cancelled by the first Ctrl-C.
///
/// A second Ctrl-C exits immediately without waiting for the child. Its kill
/// registration stays on disk and the next sweep delivers it.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        info!("Interrupt received, stopping (press Ctrl-C again to force)");
        trigger.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Second interrupt received, exiting without waiting");
            std::process::exit(FORCED_EXIT_CODE);
        }
    });

    token
}
