//! refex: referee extraction quality runner.
//! Entry point for the command-line binary.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "refex")]
#[command(about = "Scores and validates journal referee extractions")]
#[command(version)]
struct Cli {
    /// Path to refex.toml
    #[arg(short, long, global = true, env = "REFEX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score extractor dumps and write one result file per journal
    Run(commands::RunArgs),
    /// Re-validate a saved result file
    Validate(commands::ValidateArgs),
    /// Load the journal registry and report problems
    CheckConfig(commands::CheckConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // .env before argument parsing so REFEX_CONFIG can come from it
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("refex=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    info!("refex {}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load(cli.config.as_deref())?;

    let passed = match cli.command {
        Command::Run(args) => commands::run(&config, args).await?,
        Command::Validate(args) => commands::validate(&config, args)?,
        Command::CheckConfig(args) => commands::check_config(&config, args)?,
    };

    Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
