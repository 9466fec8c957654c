//! Month summary command

use std::path::Path;

use anyhow::Result;
use recurra_core::MonthSummary;

use super::{format_brl, load_engine, read_transactions, truncate, EngineOptions};

pub fn cmd_summary(
    options: &EngineOptions,
    file: &Path,
    month: u32,
    year: i32,
    json: bool,
) -> Result<()> {
    let engine = load_engine(options)?;
    let transactions = read_transactions(file)?;

    let materialized = engine.materialize_month(&transactions, month, year);
    let summary = MonthSummary::from_transactions(&materialized);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("📊 Summary for {:02}/{}", month, year);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Income     {:>14}", format_brl(summary.income));
    println!("   Expenses   {:>14}", format_brl(summary.expenses));
    println!(
        "   Projected  {:>14}  ({} upcoming)",
        format_brl(summary.projected_expenses),
        summary.projected_count
    );
    println!("   Balance    {:>14}", format_brl(summary.balance));

    if !summary.by_bank.is_empty() {
        println!();
        println!("   🏦 By bank");
        for (bank, outflow) in &summary.by_bank {
            println!("      {:20} │ {:>14}", truncate(bank, 20), format_brl(*outflow));
        }
    }

    if !summary.by_credit_card.is_empty() {
        println!();
        println!("   💳 By credit card");
        for (card, outflow) in &summary.by_credit_card {
            println!("      {:20} │ {:>14}", truncate(card, 20), format_brl(*outflow));
        }
    }

    Ok(())
}
