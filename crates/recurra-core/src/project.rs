//! Projection of templates into a target month
//!
//! A projected instance keeps every template field except its id, date and
//! virtual markers. Its id is derived only from the template id and the target
//! month, so recomputing a month yields identical instances.

use std::sync::OnceLock;

use chrono::Datelike;
use regex::{Captures, Regex};

use crate::models::{MonthKey, Transaction};

fn parcel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\s*(\d+)\s*/\s*(\d+)\s*\)").expect("valid parcel regex"))
}

/// Id of the fixed-template instance for `target`
pub fn virtual_fixed_id(template_id: &str, target: MonthKey) -> String {
    format!("{}-fixed-{:04}-{:02}", template_id, target.year(), target.month())
}

/// Id of the installment instance for `target`
pub fn virtual_installment_id(template_id: &str, target: MonthKey) -> String {
    format!("{}-installment-{:04}-{:02}", template_id, target.year(), target.month())
}

/// Project a fixed template into `target`
///
/// Returns `None` when `target` is not strictly after the template's month or
/// the template has no id to derive from.
pub fn project_to_month(template: &Transaction, target: MonthKey) -> Option<Transaction> {
    let template_id = template.id.as_deref()?;
    if target <= template.month_key() {
        return None;
    }

    let mut instance = template.clone();
    instance.id = Some(virtual_fixed_id(template_id, target));
    instance.date = target.with_day_clamped(template.date.day());
    instance.is_virtual = true;
    instance.original_transaction_id = Some(template_id.to_string());
    Some(instance)
}

/// Parcel number and total of an installment, from metadata or a "(k/n)" token
pub fn installment_position(tx: &Transaction) -> Option<(u32, u32)> {
    let position = match (tx.installment_number, tx.total_installments) {
        (Some(number), Some(total)) => (number, total),
        _ => {
            let caps = parcel_re().captures(&tx.description)?;
            (caps[1].parse().ok()?, caps[2].parse().ok()?)
        }
    };
    let (number, total) = position;
    (number >= 1 && number <= total).then_some(position)
}

/// Project the parcel of an installment purchase that falls in `target`
///
/// Parcel `k/n` dated in month M becomes parcel `k+d/n` in month M+d, as long
/// as `k+d <= n`. A "(k/n)" token in the description is rewritten to match.
pub fn project_installment(template: &Transaction, target: MonthKey) -> Option<Transaction> {
    let template_id = template.id.as_deref()?;
    let (number, total) = installment_position(template)?;

    let offset = target.months_since(template.month_key());
    if offset < 1 {
        return None;
    }
    let parcel = u32::try_from(offset).ok()?.checked_add(number)?;
    if parcel > total {
        return None;
    }

    let mut instance = template.clone();
    instance.id = Some(virtual_installment_id(template_id, target));
    instance.date = target.with_day_clamped(template.date.day());
    instance.description = rewrite_parcel(&template.description, parcel, total);
    instance.is_installment = true;
    instance.installment_number = Some(parcel);
    instance.total_installments = Some(total);
    instance.is_virtual = true;
    instance.original_transaction_id = Some(template_id.to_string());
    Some(instance)
}

fn rewrite_parcel(description: &str, parcel: u32, total: u32) -> String {
    parcel_re()
        .replacen(description, 1, |_: &Captures| format!("({}/{})", parcel, total))
        .into_owned()
}
