//! Month summaries
//!
//! Aggregates a materialized month into the totals the dashboard shows:
//! income, expenses, balance, how much of the expenses are still projected,
//! and the net outflow per bank account and per credit card.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Transaction;

/// Totals for one materialized month
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub income: f64,
    pub expenses: f64,
    /// Income minus expenses
    pub balance: f64,
    /// Expenses that come from projected (not yet recorded) instances
    pub projected_expenses: f64,
    /// Net outflow (expenses minus income) per bank, for debit/PIX transactions
    pub by_bank: BTreeMap<String, f64>,
    /// Net outflow per credit card, for credit transactions
    pub by_credit_card: BTreeMap<String, f64>,
    pub transaction_count: usize,
    pub projected_count: usize,
}

impl MonthSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut summary = Self::default();

        for tx in transactions {
            let signed_outflow = if tx.is_income() { -tx.amount } else { tx.amount };

            if tx.is_income() {
                summary.income += tx.amount;
            } else {
                summary.expenses += tx.amount;
                if tx.is_virtual {
                    summary.projected_expenses += tx.amount;
                }
            }

            match tx.payment_method {
                Some(method) if method.uses_bank() => {
                    if let Some(bank) = &tx.bank {
                        *summary.by_bank.entry(bank.clone()).or_insert(0.0) += signed_outflow;
                    }
                }
                _ if tx.is_credit() => {
                    if let Some(card) = &tx.credit_card {
                        *summary.by_credit_card.entry(card.clone()).or_insert(0.0) += signed_outflow;
                    }
                }
                _ => {}
            }

            summary.transaction_count += 1;
            if tx.is_virtual {
                summary.projected_count += 1;
            }
        }

        summary.balance = summary.income - summary.expenses;
        summary
    }
}
