//! logscout CLI -- log format recommendation from the command line
//!
//! Exit codes are mapped in [`error::CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use logscout_core::config::GeneralConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let config_path = cli.config.as_deref();

    // `config validate` reports a broken config itself, so loading is deferred until dispatch.
    let loaded = commands::load_config(config_path).await;
    let general = loaded
        .as_ref()
        .map(|c| c.general.clone())
        .unwrap_or_else(|_| GeneralConfig::default());
    logging::init_tracing(&general, cli.log_level.as_deref())?;

    tracing::debug!(command = ?cli.command, "logscout starting");

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, config_path, &writer).await,
        Commands::Recommend(args) => {
            commands::recommend::execute(args, &loaded?, &writer).await
        }
        Commands::Analyze(args) => commands::analyze::execute(args, &loaded?, &writer).await,
        Commands::Formats(args) => commands::formats::execute(args, &loaded?, &writer).await,
    }
}
