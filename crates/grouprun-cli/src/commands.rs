//! Subcommands and their arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use grouprun_core::{OutputTarget, ProcessSpec};
use grouprun_runtime::TracingSink;

/// Default pause between watchdog sweeps.
pub const DEFAULT_WATCHDOG_INTERVAL_MS: u64 = 1_000;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command in its own process group
    Run(RunArgs),

    /// Kill process groups whose launcher died, then exit
    Sweep,

    /// Keep sweeping for orphaned process groups until interrupted
    Watchdog {
        /// Milliseconds between sweeps
        #[arg(long, default_value_t = DEFAULT_WATCHDOG_INTERVAL_MS)]
        interval_ms: u64,
    },
}

/// Arguments of `grouprun run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Label used in logs and the kill registry (defaults to the program name)
    #[arg(long)]
    pub name: Option<String>,

    /// Working directory for the command
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Set an environment variable for the command (repeatable)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Pass the current environment through alongside any --env values
    #[arg(long)]
    pub inherit_env: bool,

    /// Send the command's stdout and stderr to the debug log (shown with --verbose)
    #[arg(long)]
    pub log_output: bool,

    /// Program to run, followed by its arguments
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Build the process spec described by these arguments.
    ///
    /// Returns `None` when no program was given.
    pub fn to_spec(&self) -> Option<ProcessSpec> {
        let (program, args) = self.command.split_first()?;

        let mut spec = ProcessSpec::command(program.as_str(), args).inherit_os_env(self.inherit_env);
        if let Some(name) = &self.name {
            spec = spec.with_name(name.as_str());
        }
        if let Some(dir) = &self.cwd {
            spec = spec.with_working_dir(dir);
        }
        for (key, value) in &self.env {
            spec = spec.with_env(key.as_str(), value.as_str());
        }
        if self.log_output {
            let stdout = OutputTarget::sink(TracingSink::new(spec.name.clone(), "stdout"));
            let stderr = OutputTarget::sink(TracingSink::new(spec.name.clone(), "stderr"));
            spec = spec.with_stdout(stdout).with_stderr(stderr);
        }
        Some(spec)
    }
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing variable name in '{raw}'")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
