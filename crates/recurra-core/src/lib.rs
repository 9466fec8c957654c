//! Recurra Core Library
//!
//! Materialization engine for a personal-finance tracker:
//! - Ingestion of raw transaction records with legacy flag normalization
//! - Fixed-template classification (explicit flags, installment override,
//!   keyword vocabulary, optional repetition fallback)
//! - Projection of templates and installments into a target month
//! - Duplicate suppression against transactions already recorded
//! - Month summaries per bank and per credit card
//!
//! The engine is pure: it never performs I/O during materialization and never
//! mutates its inputs.

pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod ingest;
pub mod materialize;
pub mod models;
pub mod project;
pub mod summary;

pub use classify::{Classification, FixedClassifier, RepetitionIndex};
pub use config::{ClassifierConfig, DedupConfig, EngineConfig, RepetitionConfig};
pub use dedup::{collapse_virtuals, suppress_duplicates};
pub use error::{Error, Result};
pub use ingest::{ingest_str, ingest_value};
pub use materialize::{
    default_engine, materialize_month, materialize_month_json, sort_for_display, Materializer,
};
pub use models::{MonthKey, PaymentMethod, Transaction, TransactionType};
pub use project::{project_installment, project_to_month};
pub use summary::MonthSummary;
