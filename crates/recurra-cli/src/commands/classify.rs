//! Classification report command

use std::path::Path;

use anyhow::Result;

use super::{format_brl, load_engine, read_transactions, truncate, EngineOptions};

pub fn cmd_classify(options: &EngineOptions, file: &Path, fixed_only: bool) -> Result<()> {
    let engine = load_engine(options)?;
    let transactions = read_transactions(file)?;

    let classifier = engine.classifier();
    let history = classifier.history_for(&transactions);

    let rows: Vec<_> = transactions
        .iter()
        .map(|tx| (tx, classifier.classify_with_history(tx, &history)))
        .filter(|(_, class)| !fixed_only || class.is_fixed())
        .collect();

    if rows.is_empty() {
        println!("No transactions to classify.");
        return Ok(());
    }

    println!();
    println!("🏷️  Classification");
    println!("   ─────────────────────────────────────────────────────────────");

    for (tx, class) in &rows {
        let icon = if class.is_fixed() { "📌" } else { "  " };
        println!(
            "   {} {} │ {:28} │ {:>12} │ {}",
            icon,
            tx.date,
            truncate(&tx.description, 28),
            format_brl(tx.amount),
            class
        );
    }

    let fixed = rows.iter().filter(|(_, c)| c.is_fixed()).count();
    println!();
    println!("   {} of {} classified as fixed", fixed, rows.len());

    Ok(())
}
