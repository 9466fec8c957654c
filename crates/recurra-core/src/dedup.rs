//! Duplicate suppression for projected instances
//!
//! A projected instance is dropped when the user already recorded that month's
//! occurrence by hand. Match predicate (all must hold):
//! - same description (exact)
//! - amounts closer than the configured tolerance
//! - same payment method, and the same card when paid by credit
//! - day-of-month within the configured distance
//!
//! A recorded transaction that points back at the template through
//! `recurringParentId`/`originalTransactionId` also suppresses it.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::config::DedupConfig;
use crate::models::{MonthKey, Transaction};

/// Same obligation regardless of the day it fell on
pub fn same_obligation(a: &Transaction, b: &Transaction, config: &DedupConfig) -> bool {
    a.description == b.description
        && (a.amount - b.amount).abs() < config.amount_tolerance
        && a.payment_method == b.payment_method
        && (!a.is_credit() || a.credit_card == b.credit_card)
}

/// Whether a projected instance duplicates a recorded transaction
pub fn is_duplicate(projected: &Transaction, recorded: &Transaction, config: &DedupConfig) -> bool {
    let day_gap = projected.date.day().abs_diff(recorded.date.day());
    (same_obligation(projected, recorded, config) && day_gap <= config.day_tolerance)
        || refers_to_same_template(projected, recorded)
}

fn refers_to_same_template(projected: &Transaction, recorded: &Transaction) -> bool {
    let Some(template_id) = projected.original_transaction_id.as_deref() else {
        return false;
    };
    recorded.recurring_parent_id.as_deref() == Some(template_id)
        || recorded.original_transaction_id.as_deref() == Some(template_id)
}

/// Drop every projected instance that duplicates a transaction recorded in the month
pub fn suppress_duplicates(
    projected: Vec<Transaction>,
    recorded: &[Transaction],
    config: &DedupConfig,
) -> Vec<Transaction> {
    projected
        .into_iter()
        .filter(|v| match recorded.iter().find(|r| is_duplicate(v, r, config)) {
            Some(r) => {
                debug!(
                    "Suppressing projected '{}' on {}: already recorded on {}",
                    v.description, v.date, r.date
                );
                false
            }
            None => true,
        })
        .collect()
}

/// Keep one projected instance per occurrence of each obligation
///
/// Every stored occurrence of a fixed obligation is itself a template, so a
/// bill logged in January and February would otherwise project twice. Each
/// candidate carries the date of the template it came from:
/// - instances whose template month is older than another template of the
///   same obligation are dropped
/// - within the newest month, an instance whose day is within the day
///   tolerance of one already kept is a twin and is dropped (first in input
///   order wins); charges further apart, such as weekly ones, all survive
/// - a newest template sitting on the last day of its month keeps the later
///   day of the previous occurrence, so rent due on the 31st and recorded on
///   Feb 28 still lands on the 31st afterwards
pub fn collapse_virtuals(
    candidates: Vec<(NaiveDate, Transaction)>,
    config: &DedupConfig,
) -> Vec<Transaction> {
    let superseded: Vec<bool> = candidates
        .iter()
        .map(|(template_date, v)| {
            let month = MonthKey::of(*template_date);
            candidates.iter().any(|(other_date, other)| {
                MonthKey::of(*other_date) > month && same_obligation(v, other, config)
            })
        })
        .collect();
    let anchors: Vec<Option<u32>> = candidates
        .iter()
        .map(|(template_date, v)| month_end_anchor(*template_date, v, &candidates, config))
        .collect();

    let mut kept: Vec<Transaction> = Vec::new();
    let rows = candidates.into_iter().zip(superseded).zip(anchors);
    for (((_, mut v), superseded), anchor) in rows {
        if superseded {
            debug!("Collapsing projected '{}' from an older template", v.description);
            continue;
        }
        if let Some(day) = anchor {
            v.date = MonthKey::of(v.date).with_day_clamped(day);
        }
        let twin = kept.iter().any(|k| {
            same_obligation(&v, k, config)
                && k.date.day().abs_diff(v.date.day()) <= config.day_tolerance
        });
        if twin {
            debug!("Collapsing projected '{}' on {}: twin template", v.description, v.date);
            continue;
        }
        kept.push(v);
    }
    kept
}

/// Day a month-end template was most likely clamped from
fn month_end_anchor(
    template_date: NaiveDate,
    projected: &Transaction,
    candidates: &[(NaiveDate, Transaction)],
    config: &DedupConfig,
) -> Option<u32> {
    let month = MonthKey::of(template_date);
    if template_date != month.last_day() {
        return None;
    }
    candidates
        .iter()
        .filter(|(other_date, other)| {
            MonthKey::of(*other_date) < month
                && other_date.day() > template_date.day()
                && same_obligation(projected, other, config)
        })
        .max_by_key(|(other_date, _)| *other_date)
        .map(|(other_date, _)| other_date.day())
}
