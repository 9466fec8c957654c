//! Shared command utilities
//!
//! This module contains:
//! - `load_engine` - Build the materializer from config plus CLI switches
//! - `read_transactions` - Read and ingest a JSON transaction export
//! - `resolve_month` - Fill in the current month/year when omitted

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use recurra_core::{ingest_str, EngineConfig, Materializer, MonthKey, Transaction};
use tracing::debug;

/// Engine switches shared by every command
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub config: Option<PathBuf>,
    pub repetition: bool,
    pub installments: bool,
}

/// Load the engine config and apply CLI overrides
pub fn load_engine(options: &EngineOptions) -> Result<Materializer> {
    let mut config =
        EngineConfig::load(options.config.as_deref()).context("Failed to load engine config")?;

    // Flags only switch features on; the config file may already enable them
    if options.repetition {
        config.classifier.repetition.enabled = true;
    }
    if options.installments {
        config.project_installments = true;
    }

    debug!(
        "Engine: {} keywords, repetition {}, installments {}",
        config.classifier.keywords.len(),
        config.classifier.repetition.enabled,
        config.project_installments
    );

    Materializer::new(config).context("Invalid engine config")
}

/// Read a JSON export and ingest its transactions
pub fn read_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    ingest_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Default missing month/year to today, then validate
pub fn resolve_month(month: Option<u32>, year: Option<i32>) -> Result<(u32, i32)> {
    let today = chrono::Local::now().date_naive();
    let month = month.unwrap_or_else(|| today.month());
    let year = year.unwrap_or_else(|| today.year());

    MonthKey::new(month, year).context("Invalid --month/--year (month must be 1-12)")?;
    Ok((month, year))
}
