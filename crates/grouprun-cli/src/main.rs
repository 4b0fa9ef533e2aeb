//! CLI entry point.

use std::time::Duration;

use clap::Parser;

use grouprun_cli::handlers::{self, format_report};
use grouprun_cli::{Cli, CliConfig, Commands, init_logging, shutdown_token};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = CliConfig::from_cli(&cli);

    match &cli.command {
        Commands::Run(args) => {
            let cancel = shutdown_token();
            let code = handlers::run::execute(&config, args, &cancel).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Sweep => {
            let report = handlers::sweep::execute(&config)?;
            println!("{}", format_report(&report));
        }
        Commands::Watchdog { interval_ms } => {
            let interval = Duration::from_millis(*interval_ms);
            let report = handlers::watchdog::execute(&config, interval, shutdown_token()).await?;
            println!("{}", format_report(&report));
        }
    }

    Ok(())
}
