//! Paisa CLI - Monthly expense forecaster
//!
//! Usage:
//!   paisa serve --port 8000                                  Start web server
//!   paisa forecast --last-month 2025-10-01 1000 1200 1100    Forecast offline
//!   paisa model                                              Inspect the model

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.model.as_deref())?;

    match cli.command {
        Commands::Serve { port, host } => commands::cmd_serve(config, &host, port).await,
        Commands::Forecast {
            last_month,
            horizon,
            json,
            amounts,
        } => commands::cmd_forecast(&config, &amounts, &last_month, horizon, json),
        Commands::Model => commands::cmd_model(&config),
    }
}
