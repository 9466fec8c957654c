//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Recurra - Project fixed bills and installments into any month
#[derive(Parser)]
#[command(name = "recurra")]
#[command(about = "Materialize fixed transactions and installments for a month", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also treat descriptions seen in several distinct months as fixed
    #[arg(long, global = true)]
    pub repetition: bool,

    /// Project remaining installment parcels into later months
    #[arg(long, global = true)]
    pub installments: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show recorded and projected transactions for a month
    Materialize {
        /// JSON file with the transaction export
        #[arg(short, long)]
        file: PathBuf,

        /// Month (1-12, defaults to the current month)
        #[arg(short, long)]
        month: Option<u32>,

        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show how each transaction is classified
    Classify {
        /// JSON file with the transaction export
        #[arg(short, long)]
        file: PathBuf,

        /// Only list transactions classified as fixed
        #[arg(long)]
        fixed_only: bool,
    },

    /// Show month totals per bank and credit card
    Summary {
        /// JSON file with the transaction export
        #[arg(short, long)]
        file: PathBuf,

        /// Month (1-12, defaults to the current month)
        #[arg(short, long)]
        month: Option<u32>,

        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
