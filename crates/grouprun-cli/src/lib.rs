//! Command-line front end for grouprun.
//!
//! Wires the runtime together: a [`grouprun_runtime::Launcher`] backed by the
//! on-disk kill registry, Ctrl-C bridged to cancellation, and `tracing`
//! output on stderr.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliConfig, init_logging, shutdown_token};
pub use commands::{Commands, RunArgs};
pub use parser::Cli;
