//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init, status and shared utilities (open_db, load_config, build_extractor)
//! - `parse` - Sentence interpretation commands (parse, add, categorize)
//! - `import` - Statement CSV import
//! - `prompts` - Prompt library management commands
//! - `transactions` - Transaction listing

pub mod core;
pub mod import;
pub mod parse;
pub mod prompts;
pub mod transactions;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use parse::*;
pub use prompts::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount in Brazilian style ("1.234,56")
pub fn format_brl(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let integer = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("R$ {},{:02}", grouped, cents % 100)
}
