//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Paisa - Forecast next months' spending from your monthly totals
#[derive(Parser)]
#[command(name = "paisa")]
#[command(about = "Monthly expense forecaster", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model artifact (overrides config and PAISA_MODEL_PATH)
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Forecast from monthly totals given on the command line
    Forecast {
        /// Last month covered by the amounts (YYYY-MM-DD or YYYY-MM)
        #[arg(short, long)]
        last_month: String,

        /// Months to forecast (defaults to the configured horizon)
        #[arg(long)]
        horizon: Option<usize>,

        /// Print the forecast as JSON
        #[arg(long)]
        json: bool,

        /// Monthly totals, oldest first
        #[arg(required = true, allow_negative_numbers = true)]
        amounts: Vec<f64>,
    },

    /// Show the configured model artifact
    Model,
}
