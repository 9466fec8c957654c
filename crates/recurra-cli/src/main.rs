//! Recurra CLI - Fixed transaction materialization
//!
//! Usage:
//!   recurra materialize --file txs.json --month 3 --year 2025
//!   recurra classify --file txs.json
//!   recurra summary --file txs.json --month 3

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
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
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let options = commands::EngineOptions {
        config: cli.config,
        repetition: cli.repetition,
        installments: cli.installments,
    };

    match cli.command {
        Commands::Materialize {
            file,
            month,
            year,
            json,
        } => {
            let (month, year) = commands::resolve_month(month, year)?;
            commands::cmd_materialize(&options, &file, month, year, json)
        }
        Commands::Classify { file, fixed_only } => {
            commands::cmd_classify(&options, &file, fixed_only)
        }
        Commands::Summary {
            file,
            month,
            year,
            json,
        } => {
            let (month, year) = commands::resolve_month(month, year)?;
            commands::cmd_summary(&options, &file, month, year, json)
        }
    }
}
