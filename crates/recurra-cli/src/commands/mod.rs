//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (engine setup, reading exports, month defaults)
//! - `materialize` - Month view with projected transactions
//! - `classify` - Per-transaction classification report
//! - `summary` - Month totals per bank and credit card

pub mod classify;
pub mod core;
pub mod materialize;
pub mod summary;

// Re-export command functions for main.rs
pub use classify::*;
pub use self::core::*;
pub use materialize::*;
pub use summary::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount as Brazilian reais ("R$ 1.234,56")
pub fn format_brl(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}
