//! Month view command

use std::path::Path;

use anyhow::Result;
use recurra_core::{sort_for_display, Transaction};

use super::{format_brl, load_engine, read_transactions, truncate, EngineOptions};

pub fn cmd_materialize(
    options: &EngineOptions,
    file: &Path,
    month: u32,
    year: i32,
    json: bool,
) -> Result<()> {
    let engine = load_engine(options)?;
    let transactions = read_transactions(file)?;

    let mut result = engine.materialize_month(&transactions, month, year);
    sort_for_display(&mut result);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.is_empty() {
        println!("No transactions for {:02}/{}.", month, year);
        return Ok(());
    }

    let projected = result.iter().filter(|t| t.is_virtual).count();

    println!();
    println!("📅 Transactions for {:02}/{}", month, year);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &result {
        let marker = if tx.is_virtual { "🔁" } else { "  " };
        let sign = if tx.is_income() { "+" } else { "-" };
        println!(
            "   {} {} │ {:28} │ {}{:>12} │ {}",
            marker,
            tx.date.format("%d/%m"),
            truncate(&tx.description, 28),
            sign,
            format_brl(tx.amount),
            account_label(tx)
        );
    }

    println!();
    println!(
        "   {} recorded, {} projected (🔁)",
        result.len() - projected,
        projected
    );

    Ok(())
}

/// "credit · Nubank", "pix · Itaú", "cash" or "?" when unknown
pub fn account_label(tx: &Transaction) -> String {
    let Some(method) = tx.payment_method else {
        return "?".to_string();
    };
    let account = if tx.is_credit() {
        tx.credit_card.as_deref()
    } else if method.uses_bank() {
        tx.bank.as_deref()
    } else {
        None
    };
    match account {
        Some(account) => format!("{} · {}", method, account),
        None => method.to_string(),
    }
}
