//! Month materialization
//!
//! Single entry point that turns the full transaction history into the list
//! shown for one month:
//! 1. Transactions recorded in the target month are kept as-is
//! 2. Fixed templates dated before the month are projected into it
//!    (and, when enabled, installment parcels are advanced into it)
//! 3. Projections repeated by older templates are collapsed
//! 4. Projections the user already recorded by hand are suppressed
//!
//! Materialization never fails: malformed input degrades to fewer (or no)
//! transactions rather than an error.

use std::sync::OnceLock;

use serde_json::Value;
use tracing::{info, warn};

use crate::classify::{Classification, FixedClassifier};
use crate::config::EngineConfig;
use crate::dedup::{collapse_virtuals, suppress_duplicates};
use crate::error::Result;
use crate::ingest::ingest_value;
use crate::models::{MonthKey, Transaction};
use crate::project::{project_installment, project_to_month};

/// Materialization engine with a compiled classifier
#[derive(Debug, Clone)]
pub struct Materializer {
    config: EngineConfig,
    classifier: FixedClassifier,
}

impl Materializer {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let classifier = FixedClassifier::new(&config.classifier)?;
        Ok(Self { config, classifier })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &FixedClassifier {
        &self.classifier
    }

    /// Materialize `(month, year)`; an invalid month yields an empty list
    pub fn materialize_month(
        &self,
        all: &[Transaction],
        month: u32,
        year: i32,
    ) -> Vec<Transaction> {
        match MonthKey::new(month, year) {
            Ok(target) => self.materialize(all, target),
            Err(e) => {
                warn!("Not materializing: {}", e);
                Vec::new()
            }
        }
    }

    /// Ingest raw JSON records and materialize `(month, year)`
    pub fn materialize_json(&self, records: &Value, month: u32, year: i32) -> Vec<Transaction> {
        self.materialize_month(&ingest_value(records), month, year)
    }

    /// Recorded transactions of `target` followed by the surviving projections
    pub fn materialize(&self, all: &[Transaction], target: MonthKey) -> Vec<Transaction> {
        let recorded: Vec<Transaction> = all
            .iter()
            .filter(|t| !t.is_virtual && target.contains(t.date))
            .cloned()
            .collect();

        let history = self.classifier.history_for(all);
        let cutoff = target.first_day();

        let mut candidates = Vec::new();
        for template in all.iter().filter(|t| !t.is_virtual && t.date < cutoff) {
            let projected = match self.classifier.classify_with_history(template, &history) {
                c if c.is_fixed() => project_to_month(template, target),
                Classification::Installment if self.config.project_installments => {
                    project_installment(template, target)
                }
                _ => None,
            };
            if let Some(instance) = projected {
                candidates.push((template.date, instance));
            }
        }

        let candidate_count = candidates.len();
        let projected = collapse_virtuals(candidates, &self.config.dedup);
        let projected = suppress_duplicates(projected, &recorded, &self.config.dedup);

        info!(
            "Materialized {}: {} recorded, {} projected ({} candidates)",
            target,
            recorded.len(),
            projected.len(),
            candidate_count
        );

        let mut result = recorded;
        result.extend(projected);
        result
    }
}

impl Default for Materializer {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            classifier: FixedClassifier::default(),
        }
    }
}

/// Shared engine with the built-in configuration
pub fn default_engine() -> &'static Materializer {
    static ENGINE: OnceLock<Materializer> = OnceLock::new();
    ENGINE.get_or_init(Materializer::default)
}

/// Materialize with the built-in configuration
pub fn materialize_month(all: &[Transaction], month: u32, year: i32) -> Vec<Transaction> {
    default_engine().materialize_month(all, month, year)
}

/// Ingest and materialize with the built-in configuration; non-list input yields nothing
pub fn materialize_month_json(records: &Value, month: u32, year: i32) -> Vec<Transaction> {
    default_engine().materialize_json(records, month, year)
}

/// Newest first, keeping input order between same-day transactions
pub fn sort_for_display(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}
