//! Domain models for Recurra

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" | "entrada" => Ok(Self::Income),
            "expense" | "despesa" | "saida" | "saída" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a transaction was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Debit from a bank account
    Debit,
    /// Charged to a credit card
    Credit,
    /// Instant transfer from a bank account
    Pix,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Pix => "pix",
            Self::Cash => "cash",
        }
    }

    /// Methods that settle against a bank account rather than a card
    pub fn uses_bank(&self) -> bool {
        matches!(self, Self::Debit | Self::Pix)
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" | "debito" | "débito" => Ok(Self::Debit),
            "credit" | "credito" | "crédito" | "cartao" | "cartão" | "credit_card" => {
                Ok(Self::Credit)
            }
            "pix" => Ok(Self::Pix),
            "cash" | "dinheiro" => Ok(Self::Cash),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A calendar month, always backed by a valid first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    first: NaiveDate,
}

impl MonthKey {
    /// Build a month key, rejecting months outside 1..=12 and unrepresentable years
    pub fn new(month: u32, year: i32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(Error::InvalidMonth { month, year })
    }

    /// The month a date falls in
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - chrono::Duration::days(i64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        self.first
            .checked_add_months(Months::new(1))
            .map(|next| (next - self.first).num_days() as u32)
            .unwrap_or(31)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.with_day_clamped(31)
    }

    /// Date in this month with the given day, clamped to the month's last day
    pub fn with_day_clamped(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        self.first.with_day(day).unwrap_or(self.first)
    }

    /// Signed number of months from `earlier` to `self`
    pub fn months_since(&self, earlier: MonthKey) -> i64 {
        let index = |m: &MonthKey| i64::from(m.year()) * 12 + i64::from(m.month0());
        index(self) - index(&earlier)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    fn month0(&self) -> u32 {
        self.first.month0()
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// A transaction record, either stored (real) or produced by the engine (virtual)
///
/// Legacy "fixed" signals (`isFixed`, `fixed`, `isRecurring`) are folded into
/// `is_fixed` at ingestion, so nothing downstream inspects the raw keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Store id for real records; deterministic composite for virtual ones
    pub id: Option<String>,
    pub description: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub date: NaiveDate,
    pub payment_method: Option<PaymentMethod>,
    pub bank: Option<String>,
    pub credit_card: Option<String>,
    pub is_fixed: bool,
    pub is_installment: bool,
    pub installment_number: Option<u32>,
    pub total_installments: Option<u32>,
    /// Set only on instances produced by the engine
    pub is_virtual: bool,
    /// Template a virtual instance was derived from
    pub original_transaction_id: Option<String>,
    /// Stored back-reference from a generated instance to its template
    pub recurring_parent_id: Option<String>,
    /// Any other fields from the source record, carried through unchanged
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Transaction {
    /// Minimal real expense, mostly for tests and programmatic callers
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Some(id.into()),
            description: description.into(),
            amount,
            transaction_type: TransactionType::Expense,
            category: None,
            date,
            payment_method: None,
            bank: None,
            credit_card: None,
            is_fixed: false,
            is_installment: false,
            installment_number: None,
            total_installments: None,
            is_virtual: false,
            original_transaction_id: None,
            recurring_parent_id: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::of(self.date)
    }

    pub fn is_credit(&self) -> bool {
        self.payment_method == Some(PaymentMethod::Credit)
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    /// Amount in integer cents, used as a grouping key
    pub fn amount_cents(&self) -> i64 {
        (self.amount * 100.0).round() as i64
    }
}

/// Wire shape of a transaction (camelCase, both legacy flag spellings emitted)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    description: &'a str,
    amount: f64,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bank: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credit_card: Option<&'a str>,
    is_fixed: bool,
    is_recurring: bool,
    is_installment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    installment_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_installments: Option<u32>,
    is_virtual_fixed: bool,
    is_virtual: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_transaction_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recurring_parent_id: Option<&'a str>,
    #[serde(flatten)]
    extra: &'a serde_json::Map<String, serde_json::Value>,
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        TransactionOut {
            id: self.id.as_deref(),
            description: &self.description,
            amount: self.amount,
            transaction_type: self.transaction_type,
            category: self.category.as_deref(),
            date: self.date,
            payment_method: self.payment_method,
            bank: self.bank.as_deref(),
            credit_card: self.credit_card.as_deref(),
            is_fixed: self.is_fixed,
            is_recurring: self.is_fixed,
            is_installment: self.is_installment,
            installment_number: self.installment_number,
            total_installments: self.total_installments,
            is_virtual_fixed: self.is_virtual,
            is_virtual: self.is_virtual,
            original_transaction_id: self.original_transaction_id.as_deref(),
            recurring_parent_id: self.recurring_parent_id.as_deref(),
            extra: &self.extra,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_key_rejects_invalid_month() {
        assert!(MonthKey::new(0, 2025).is_err());
        assert!(MonthKey::new(13, 2025).is_err());
        assert!(MonthKey::new(12, 2025).is_ok());
    }

    #[test]
    fn test_month_key_days_in_month() {
        assert_eq!(MonthKey::new(2, 2025).unwrap().days_in_month(), 28);
        assert_eq!(MonthKey::new(2, 2024).unwrap().days_in_month(), 29);
        assert_eq!(MonthKey::new(4, 2025).unwrap().days_in_month(), 30);
        assert_eq!(MonthKey::new(12, 2025).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_month_key_clamps_day() {
        let feb = MonthKey::new(2, 2025).unwrap();
        assert_eq!(feb.with_day_clamped(31), date(2025, 2, 28));
        assert_eq!(feb.with_day_clamped(10), date(2025, 2, 10));
        assert_eq!(feb.last_day(), date(2025, 2, 28));
    }

    #[test]
    fn test_month_key_of_and_ordering() {
        let key = MonthKey::of(date(2025, 3, 15));
        assert_eq!(key.year(), 2025);
        assert_eq!(key.month(), 3);
        assert_eq!(key.first_day(), date(2025, 3, 1));
        assert!(MonthKey::new(12, 2024).unwrap() < key);
        assert!(key.contains(date(2025, 3, 31)));
        assert!(!key.contains(date(2025, 4, 1)));
        assert_eq!(key.to_string(), "2025-03");
    }

    #[test]
    fn test_months_since_crosses_years() {
        let nov = MonthKey::new(11, 2024).unwrap();
        let feb = MonthKey::new(2, 2025).unwrap();
        assert_eq!(feb.months_since(nov), 3);
        assert_eq!(nov.months_since(feb), -3);
    }

    #[test]
    fn test_payment_method_aliases() {
        assert_eq!("crédito".parse::<PaymentMethod>(), Ok(PaymentMethod::Credit));
        assert_eq!("PIX".parse::<PaymentMethod>(), Ok(PaymentMethod::Pix));
        assert_eq!("dinheiro".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert!("boleto".parse::<PaymentMethod>().is_err());
        assert!(PaymentMethod::Pix.uses_bank());
        assert!(!PaymentMethod::Credit.uses_bank());
    }

    #[test]
    fn test_serialize_emits_both_flag_spellings() {
        let mut tx = Transaction::new("A", "Netflix", 39.9, date(2025, 3, 10));
        tx.is_fixed = true;
        tx.is_virtual = true;
        tx.payment_method = Some(PaymentMethod::Credit);
        tx.extra.insert("userId".to_string(), serde_json::json!("u1"));

        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["isFixed"], true);
        assert_eq!(value["isRecurring"], true);
        assert_eq!(value["isVirtualFixed"], true);
        assert_eq!(value["isVirtual"], true);
        assert_eq!(value["date"], "2025-03-10");
        assert_eq!(value["type"], "expense");
        assert_eq!(value["paymentMethod"], "credit");
        assert_eq!(value["userId"], "u1");
        assert!(value.get("creditCard").is_none());
    }
}
