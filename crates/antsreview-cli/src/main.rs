//! AntsReview CLI
//!
//! Drives the review/escrow protocol against in-memory state.
//!
//! # Usage
//!
//! ```bash
//! # Walk one task from issue to refund
//! antsreview demo
//!
//! # Same, emitting the report as JSON
//! antsreview demo --json
//!
//! # Show the effective configuration
//! antsreview --config ./antsreview.toml config
//!
//! # Environment overrides
//! ANTSREVIEW__DEMO__PAYOUT=25 antsreview demo
//! ```

mod config;
mod demo;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{AppConfig, LoggingConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// AntsReview - escrow-backed peer review
#[derive(Parser, Debug)]
#[command(name = "antsreview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, global = true, env = "ANTSREVIEW_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ANTSREVIEW_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, global = true, env = "ANTSREVIEW_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue, fund, review, accept and refund one task
    Demo {
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut app_config = AppConfig::load(cli.config.as_deref())?;

    // Override with CLI arguments
    if let Some(level) = cli.log_level {
        app_config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        app_config.logging.format = format;
    }

    init_logging(&app_config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting AntsReview");

    match cli.command {
        Commands::Demo { json } => {
            let report = demo::run(&app_config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", demo::render(&report, &app_config));
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&app_config)?);
        }
    }

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true).with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
