//! Fixed-template classification
//!
//! Decides which stored transactions are recurring obligations that should be
//! projected into later months. Rules, first match wins:
//! 1. Explicit fixed flag (already normalized at ingestion)
//! 2. Installment parcel ("(3/12)", "parcela 3 de 12", installment metadata)
//!    is never fixed
//! 3. Description contains a configured keyword
//! 4. Optional: same obligation seen in enough distinct months
//!
//! Rule 4 needs the whole history, so it only runs through
//! [`FixedClassifier::classify_with_history`].

use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use crate::config::{ClassifierConfig, RepetitionConfig};
use crate::error::Result;
use crate::models::{MonthKey, PaymentMethod, Transaction};

/// Why a transaction was (or was not) classified as fixed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Stored with an explicit fixed/recurring flag
    Explicit,
    /// Matched an installment pattern; never fixed
    Installment,
    /// Description contained this keyword
    Keyword(String),
    /// Seen in this many distinct months
    Repetition(usize),
    NotFixed,
}

impl Classification {
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Explicit | Self::Keyword(_) | Self::Repetition(_))
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "fixed (flag)"),
            Self::Installment => write!(f, "installment"),
            Self::Keyword(k) => write!(f, "fixed (keyword \"{}\")", k),
            Self::Repetition(n) => write!(f, "fixed (seen in {} months)", n),
            Self::NotFixed => write!(f, "not fixed"),
        }
    }
}

/// Classifier built from an injectable vocabulary and pattern list
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    keywords: Vec<String>,
    installment_patterns: Vec<Regex>,
    repetition: RepetitionConfig,
}

impl FixedClassifier {
    /// Compile the classifier; fails only on an invalid installment regex
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let installment_patterns = config
            .installment_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            keywords: config
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            installment_patterns,
            repetition: config.repetition.clone(),
        })
    }

    /// Whether the repetition fallback is switched on
    pub fn repetition_enabled(&self) -> bool {
        self.repetition.enabled
    }

    /// Classify using the per-record rules only (flag, installment, keyword)
    pub fn classify(&self, tx: &Transaction) -> Classification {
        if tx.is_virtual {
            return Classification::NotFixed;
        }
        if tx.is_fixed {
            return Classification::Explicit;
        }
        if self.is_installment(tx) {
            return Classification::Installment;
        }
        match self.matching_keyword(&tx.description) {
            Some(keyword) => Classification::Keyword(keyword.to_string()),
            None => Classification::NotFixed,
        }
    }

    /// Classify, falling back to repetition across `history` when enabled
    pub fn classify_with_history(
        &self,
        tx: &Transaction,
        history: &RepetitionIndex,
    ) -> Classification {
        let classification = self.classify(tx);
        if classification != Classification::NotFixed || !self.repetition.enabled || tx.is_virtual
        {
            return classification;
        }

        let months = history.distinct_months(tx);
        if months >= self.repetition.min_distinct_months.max(1) {
            Classification::Repetition(months)
        } else {
            Classification::NotFixed
        }
    }

    pub fn is_fixed_template(&self, tx: &Transaction) -> bool {
        self.classify(tx).is_fixed()
    }

    /// Installment metadata or an installment-looking description
    pub fn is_installment(&self, tx: &Transaction) -> bool {
        tx.is_installment
            || tx.total_installments.is_some_and(|n| n > 1)
            || self
                .installment_patterns
                .iter()
                .any(|re| re.is_match(&tx.description))
    }

    /// First configured keyword contained in the description
    pub fn matching_keyword(&self, description: &str) -> Option<&str> {
        let desc_lower = description.to_lowercase();
        self.keywords
            .iter()
            .find(|k| desc_lower.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Index `transactions` for the repetition fallback (empty when disabled)
    pub fn history_for(&self, transactions: &[Transaction]) -> RepetitionIndex {
        if self.repetition.enabled {
            RepetitionIndex::build(transactions)
        } else {
            RepetitionIndex::default()
        }
    }
}

impl Default for FixedClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default()).expect("default installment patterns are valid")
    }
}

/// Identity of an obligation for the repetition fallback
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RepetitionKey {
    description: String,
    amount_cents: i64,
    payment_method: Option<PaymentMethod>,
    credit_card: Option<String>,
}

impl RepetitionKey {
    fn of(tx: &Transaction) -> Self {
        Self {
            description: tx.description.trim().to_string(),
            amount_cents: tx.amount_cents(),
            payment_method: tx.payment_method,
            credit_card: tx.credit_card.clone(),
        }
    }
}

/// Distinct calendar months each description+amount+method+card combination
/// appears in
#[derive(Debug, Default)]
pub struct RepetitionIndex {
    months: HashMap<RepetitionKey, BTreeSet<MonthKey>>,
}

impl RepetitionIndex {
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut months: HashMap<RepetitionKey, BTreeSet<MonthKey>> = HashMap::new();
        for tx in transactions.iter().filter(|t| !t.is_virtual) {
            months
                .entry(RepetitionKey::of(tx))
                .or_default()
                .insert(tx.month_key());
        }
        Self { months }
    }

    pub fn distinct_months(&self, tx: &Transaction) -> usize {
        self.months
            .get(&RepetitionKey::of(tx))
            .map_or(0, BTreeSet::len)
    }
}
