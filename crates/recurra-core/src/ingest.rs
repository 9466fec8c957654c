//! Transaction ingestion from the data-access layer
//!
//! Records arrive as loosely-typed JSON written by several generations of the
//! app. Each record is normalized once here:
//! - `isFixed` / `fixed` / `isRecurring` collapse into a single flag, accepting
//!   `true`, `1` and `"true"` as truthy
//! - dates may be `YYYY-MM-DD`, ISO datetimes, `DD/MM/YYYY`, `{"$date": ...}`
//!   or epoch milliseconds; only the calendar date is kept
//! - amounts may be numbers or strings such as `"39,90"`, `"R$ 1.234,56"` or
//!   `"1.234"`; when both separators appear the last one is the decimal mark.
//!   Direction comes from `type`, so a negative amount is stored as its magnitude
//!
//! A record without a usable `date` or `description` is skipped, never fatal.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{PaymentMethod, Transaction, TransactionType};

/// Keys consumed into typed fields; everything else lands in `extra`
const KNOWN_KEYS: &[&str] = &[
    "id",
    "_id",
    "description",
    "amount",
    "type",
    "category",
    "date",
    "paymentMethod",
    "bank",
    "creditCard",
    "isFixed",
    "fixed",
    "isRecurring",
    "isInstallment",
    "installmentNumber",
    "totalInstallments",
    "isVirtualFixed",
    "isVirtual",
    "originalTransactionId",
    "recurringParentId",
];

/// Parse a JSON document and ingest the transactions in it
pub fn ingest_str(content: &str) -> Result<Vec<Transaction>> {
    let value: Value = serde_json::from_str(content)?;
    Ok(ingest_value(&value))
}

/// Ingest a JSON array of transaction records (or `{"transactions": [...]}`)
///
/// Anything that is not a list yields an empty result.
pub fn ingest_value(value: &Value) -> Vec<Transaction> {
    let records = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("transactions") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("Transaction payload is an object without a transactions list");
                return Vec::new();
            }
        },
        _ => {
            warn!("Transaction payload is not a list");
            return Vec::new();
        }
    };

    let mut transactions = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match parse_record(record) {
            Ok(tx) => transactions.push(tx),
            Err(e) => debug!(index, "Skipping transaction record: {}", e),
        }
    }

    if transactions.len() < records.len() {
        debug!(
            "Ingested {} of {} transaction records",
            transactions.len(),
            records.len()
        );
    }

    transactions
}

/// Convert one raw record into a typed transaction
pub fn parse_record(record: &Value) -> Result<Transaction> {
    let map = record
        .as_object()
        .ok_or_else(|| Error::InvalidData("record is not an object".to_string()))?;

    let description = match map.get("description") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(Error::InvalidData("missing description".to_string())),
    };

    let date = map
        .get("date")
        .and_then(parse_date)
        .ok_or_else(|| {
            Error::InvalidData(format!("missing or invalid date for '{}'", description))
        })?;

    let extra: Map<String, Value> = map
        .iter()
        .filter(|(k, _)| !KNOWN_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(Transaction {
        id: string_field(map, "id").or_else(|| string_field(map, "_id")),
        description,
        amount: map.get("amount").and_then(parse_amount).unwrap_or(0.0),
        transaction_type: string_field(map, "type")
            .and_then(|t| t.parse::<TransactionType>().ok())
            .unwrap_or_default(),
        category: string_field(map, "category"),
        date,
        payment_method: string_field(map, "paymentMethod")
            .and_then(|m| m.parse::<PaymentMethod>().ok()),
        bank: string_field(map, "bank"),
        credit_card: string_field(map, "creditCard"),
        is_fixed: ["isFixed", "fixed", "isRecurring"]
            .iter()
            .any(|k| map.get(*k).is_some_and(is_truthy)),
        is_installment: map.get("isInstallment").is_some_and(is_truthy),
        installment_number: map.get("installmentNumber").and_then(parse_u32),
        total_installments: map.get("totalInstallments").and_then(parse_u32),
        is_virtual: ["isVirtualFixed", "isVirtual"]
            .iter()
            .any(|k| map.get(*k).is_some_and(is_truthy)),
        original_transaction_id: string_field(map, "originalTransactionId"),
        recurring_parent_id: string_field(map, "recurringParentId"),
        extra,
    })
}

/// Legacy truthiness: `true`, `1`, `"true"` or `"1"`
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        _ => false,
    }
}

/// Calendar date of a stored value, ignoring time-of-day and timezone
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        Value::Object(map) => map.get("$date").and_then(parse_date),
        _ => None,
    }
}

fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(date) = raw
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    {
        return Some(date);
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}

/// Amount from a number or a locale-formatted string
pub fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_amount_str(s)?,
        _ => return None,
    };
    if !amount.is_finite() {
        return None;
    }
    if amount < 0.0 {
        debug!("Storing negative amount {} as its magnitude", amount);
        return Some(amount.abs());
    }
    Some(amount)
}

fn thousands_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d{1,3}(\.\d{3})+$").expect("valid thousands regex"))
}

fn parse_amount_str(raw: &str) -> Option<f64> {
    let s: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let normalized = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        // "1.234" is BRL thousands, not one and a fraction
        (None, Some(_)) if thousands_re().is_match(&s) => s.replace('.', ""),
        _ => s,
    };
    normalized.parse::<f64>().ok()
}

fn parse_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_non_list_payload_is_empty() {
        assert!(ingest_value(&json!(null)).is_empty());
        assert!(ingest_value(&json!("transactions")).is_empty());
        assert!(ingest_value(&json!({"data": []})).is_empty());
    }

    #[test]
    fn test_wrapped_payload() {
        let txs = ingest_value(&json!({
            "transactions": [{"id": "1", "description": "Mercado", "amount": 10, "date": "2025-01-02"}]
        }));
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let txs = ingest_value(&json!([
            {"id": "1", "description": "Mercado", "amount": 10, "date": "2025-01-02"},
            {"id": "2", "amount": 10, "date": "2025-01-02"},
            {"id": "3", "description": "Sem data", "amount": 10},
            {"id": "4", "description": "Data ruim", "date": "ontem"},
            42,
        ]));
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id.as_deref(), Some("1"));
    }

    #[test]
    fn test_legacy_fixed_flags_normalized() {
        let txs = ingest_value(&json!([
            {"id": "a", "description": "x", "date": "2025-01-01", "isFixed": true},
            {"id": "b", "description": "x", "date": "2025-01-01", "fixed": 1},
            {"id": "c", "description": "x", "date": "2025-01-01", "isRecurring": "true"},
            {"id": "d", "description": "x", "date": "2025-01-01", "isFixed": "false"},
            {"id": "e", "description": "x", "date": "2025-01-01", "isFixed": 0},
            {"id": "f", "description": "x", "date": "2025-01-01"},
        ]));
        let flags: Vec<bool> = txs.iter().map(|t| t.is_fixed).collect();
        assert_eq!(flags, vec![true, true, true, false, false, false]);
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date(&json!("2025-03-10")), Some(date(2025, 3, 10)));
        assert_eq!(
            parse_date(&json!("2025-03-31T23:30:00.000-03:00")),
            Some(date(2025, 3, 31))
        );
        assert_eq!(parse_date(&json!("10/03/2025")), Some(date(2025, 3, 10)));
        assert_eq!(
            parse_date(&json!({"$date": "2025-03-10T00:00:00Z"})),
            Some(date(2025, 3, 10))
        );
        assert_eq!(parse_date(&json!(1736467200000_i64)), Some(date(2025, 1, 10)));
        assert_eq!(parse_date(&json!(true)), None);
    }

    #[test]
    fn test_amount_formats() {
        assert_eq!(parse_amount(&json!(39.9)), Some(39.9));
        assert_eq!(parse_amount(&json!("39.90")), Some(39.9));
        assert_eq!(parse_amount(&json!("39,90")), Some(39.9));
        assert_eq!(parse_amount(&json!("R$ 1.234,56")), Some(1234.56));
        assert_eq!(parse_amount(&json!("abc")), None);

        // Thousands without cents
        assert_eq!(parse_amount(&json!("R$ 1.234")), Some(1234.0));
        assert_eq!(parse_amount(&json!("1.234")), Some(1234.0));
        assert_eq!(parse_amount(&json!("1.234.567")), Some(1234567.0));
        assert_eq!(parse_amount(&json!("12.5")), Some(12.5));

        // Last separator is the decimal mark
        assert_eq!(parse_amount(&json!("1,234.56")), Some(1234.56));
        assert_eq!(parse_amount(&json!("1.234.567,89")), Some(1234567.89));
        assert_eq!(parse_amount(&json!("R$ 1 234,56")), Some(1234.56));
    }

    #[test]
    fn test_negative_amounts_store_magnitude() {
        assert_eq!(parse_amount(&json!("-39,90")), Some(39.9));
        assert_eq!(parse_amount(&json!("-R$ 1.500,00")), Some(1500.0));
        assert_eq!(parse_amount(&json!(-10)), Some(10.0));
    }

    #[test]
    fn test_full_record_and_extra_fields() {
        let txs = ingest_value(&json!([{
            "_id": 17,
            "description": "Netflix",
            "amount": "39,90",
            "type": "expense",
            "category": "Lazer",
            "date": "2025-01-10",
            "paymentMethod": "credit",
            "creditCard": "Nubank",
            "isInstallment": false,
            "userId": "u-1",
            "createdAt": "2025-01-10T12:00:00Z"
        }]));
        let tx = &txs[0];
        assert_eq!(tx.id.as_deref(), Some("17"));
        assert_eq!(tx.amount, 39.9);
        assert_eq!(tx.payment_method, Some(PaymentMethod::Credit));
        assert_eq!(tx.credit_card.as_deref(), Some("Nubank"));
        assert_eq!(tx.category.as_deref(), Some("Lazer"));
        assert_eq!(tx.extra.len(), 2);
        assert_eq!(tx.extra["userId"], "u-1");
        assert!(!tx.is_virtual);
    }

    #[test]
    fn test_missing_amount_defaults_to_zero() {
        let txs = ingest_value(&json!([{"id": "1", "description": "x", "date": "2025-01-01"}]));
        assert_eq!(txs[0].amount, 0.0);
        assert_eq!(txs[0].transaction_type, TransactionType::Expense);
    }

    #[test]
    fn test_ingest_str_rejects_invalid_json() {
        assert!(matches!(ingest_str("[{"), Err(Error::Json(_))));
        assert_eq!(ingest_str("[]").unwrap().len(), 0);
    }
}
