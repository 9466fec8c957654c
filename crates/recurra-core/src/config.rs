//! Engine configuration
//!
//! The keyword vocabulary and installment patterns are locale-specific
//! heuristics, so they live in configuration rather than in code paths.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/recurra/config/engine.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! An explicit path must exist; only the data-dir override is optional.
//!
//! Keys missing from an override keep their built-in default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

const DEFAULT_KEYWORDS: &[&str] = &[
    "netflix",
    "spotify",
    "amazon prime",
    "prime video",
    "disney",
    "hbo",
    "youtube premium",
    "deezer",
    "globoplay",
    "paramount",
    "apple music",
    "icloud",
    "google one",
    "academia",
    "smart fit",
    "aluguel",
    "condomínio",
    "condominio",
    "internet",
    "energia",
    "conta de luz",
    "conta de água",
    "conta de agua",
    "telefone",
    "celular",
    "plano de saúde",
    "plano de saude",
    "seguro",
    "mensalidade",
    "mensal",
    "assinatura",
    "fixa",
    "fixo",
    "escola",
    "faculdade",
    "salário",
    "salario",
];

const DEFAULT_INSTALLMENT_PATTERNS: &[&str] = &[
    r"\(\s*\d+\s*/\s*\d+\s*\)",
    r"(?i)\bparcela\s+\d+\s*(?:de|/)\s*\d+",
];

/// Repetition fallback for records with no keyword hit
#[derive(Debug, Clone, PartialEq)]
pub struct RepetitionConfig {
    pub enabled: bool,
    /// Distinct calendar months a description must appear in
    pub min_distinct_months: usize,
}

impl Default for RepetitionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_distinct_months: 3,
        }
    }
}

/// Inputs to the fixed-template classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Ordered substrings, matched against the lower-cased description
    pub keywords: Vec<String>,
    /// Regexes identifying an installment parcel
    pub installment_patterns: Vec<String>,
    pub repetition: RepetitionConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            installment_patterns: DEFAULT_INSTALLMENT_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            repetition: RepetitionConfig::default(),
        }
    }
}

/// Tolerances for matching a projected instance against a recorded one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupConfig {
    /// Amounts strictly closer than this are equal
    pub amount_tolerance: f64,
    /// Maximum day-of-month distance (inclusive)
    pub day_tolerance: u32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: 0.01,
            day_tolerance: 2,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub dedup: DedupConfig,
    /// Project remaining installment parcels into later months
    pub project_installments: bool,
}

impl EngineConfig {
    /// Load configuration (explicit path or data-dir override first, then embedded default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = override_path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_file(path);
        }

        match default_config_path().filter(|p| p.exists()) {
            Some(path) => Self::load_file(&path),
            None => Self::from_toml_str(DEFAULT_CONFIG),
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        debug!("Loading engine config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse config from TOML content, layering it over the built-in defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(classifier) = raw.classifier {
            if let Some(keywords) = classifier.keywords {
                config.classifier.keywords = keywords;
            }
            if let Some(patterns) = classifier.installment_patterns {
                config.classifier.installment_patterns = patterns;
            }
            if let Some(repetition) = classifier.repetition {
                if let Some(enabled) = repetition.enabled {
                    config.classifier.repetition.enabled = enabled;
                }
                if let Some(min) = repetition.min_distinct_months {
                    config.classifier.repetition.min_distinct_months = min;
                }
            }
        }

        if let Some(dedup) = raw.dedup {
            if let Some(tolerance) = dedup.amount_tolerance {
                if !(tolerance.is_finite() && tolerance >= 0.0) {
                    return Err(Error::Config(format!(
                        "amount_tolerance must be a non-negative number, got {}",
                        tolerance
                    )));
                }
                config.dedup.amount_tolerance = tolerance;
            }
            if let Some(days) = dedup.day_tolerance {
                config.dedup.day_tolerance = days;
            }
        }

        if let Some(projection) = raw.projection {
            if let Some(installments) = projection.installments {
                config.project_installments = installments;
            }
        }

        Ok(config)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("recurra").join("config").join("engine.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    classifier: Option<RawClassifier>,
    dedup: Option<RawDedup>,
    projection: Option<RawProjection>,
}

#[derive(Debug, Deserialize)]
struct RawClassifier {
    keywords: Option<Vec<String>>,
    installment_patterns: Option<Vec<String>>,
    repetition: Option<RawRepetition>,
}

#[derive(Debug, Deserialize)]
struct RawRepetition {
    enabled: Option<bool>,
    min_distinct_months: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawDedup {
    amount_tolerance: Option<f64>,
    day_tolerance: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawProjection {
    installments: Option<bool>,
}
