//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;
use grouprun_core::DATA_DIR_ENV;

use crate::commands::Commands;

/// Run commands in their own process group and clean up after them.
#[derive(Parser, Debug)]
#[command(name = "grouprun")]
#[command(about = "Run commands as process groups that never outlive their parent")]
#[command(version)]
pub struct Cli {
    /// Override the data directory holding the kill registry
    #[arg(long = "data-dir", global = true, env = DATA_DIR_ENV, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
