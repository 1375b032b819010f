//! # ot CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use ot_client::{ClientConfig, TrialsClient};
use tracing_subscriber::EnvFilter;

/// OpenTrials command-line client.
///
/// Fetches, searches and counts clinical trials, and normalizes saved API
/// responses. Endpoints and limits come from `OPENTRIALS_*` environment
/// variables, optionally layered with a JSON settings file.
#[derive(Parser, Debug)]
#[command(name = "ot", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// JSON settings file layered over the environment configuration.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch one trial by ID.
    Get(ot_cli::fetch::GetArgs),
    /// Fetch one page of search results.
    Search(ot_cli::fetch::SearchArgs),
    /// Count the trials matching a query.
    Count(ot_cli::fetch::CountArgs),
    /// Normalize a local JSON document.
    Tidy(ot_cli::tidy::TidyArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ClientConfig> {
    let base = ClientConfig::from_env().context("invalid environment configuration")?;
    let over = ot_cli::settings::load_override(path)?;
    Ok(base.merge(&over))
}

fn http_client(config: ClientConfig) -> anyhow::Result<TrialsClient> {
    TrialsClient::new(config).context("failed to build HTTP client")
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Get(args) => ot_cli::fetch::run_get(args, &http_client(config)?).await,
        Commands::Search(args) => ot_cli::fetch::run_search(args, &http_client(config)?).await,
        Commands::Count(args) => ot_cli::fetch::run_count(args, &http_client(config)?).await,
        Commands::Tidy(args) => ot_cli::tidy::run_tidy(args, &config),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
