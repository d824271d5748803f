//! Flagwise - feature flag targeting from the command line
//!
//! Run with: `flagwise <command> [--user ID] [--roles a,b]`
//!
//! Command results are printed to stdout as JSON; logs go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use flagwise_infra::config;
use flagwise_lib::cli::{self, Cli, Command};
use flagwise_lib::utils::init_tracing;
use flagwise_lib::AppContext;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Command failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    // Load .env before the config loader reads FLAGWISE_* variables
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("failed to load configuration")?;
    init_tracing(&config.logging)?;

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) => debug!(error = %e, "no .env file loaded"),
    }

    let ctx = AppContext::from_config(config).context("failed to initialise flag store")?;
    info!("flagwise starting");

    let output = cli::execute(&ctx, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
