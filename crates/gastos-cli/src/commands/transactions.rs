//! Transaction command implementations

use anyhow::Result;
use gastos_core::{Database, TransactionType};

use super::{format_brl, truncate};

pub fn cmd_transactions_list(db: &Database, owner: &str, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(owner, limit)?;

    if transactions.is_empty() {
        println!("No transactions found for {}. Add one with:", owner);
        println!("  gastos add \"gastei 50 reais no mercado\" --owner {}", owner);
        return Ok(());
    }

    let total = db.count_transactions(owner)?;

    println!();
    println!("📝 Recent Transactions ({} of {})", transactions.len(), total);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.transaction_type {
            TransactionType::Expense => format!("\x1b[31m-{}\x1b[0m", format_brl(tx.amount)),
            TransactionType::Income => format!("\x1b[32m+{}\x1b[0m", format_brl(tx.amount)),
        };

        println!(
            "   [{}] {} │ {:>14} │ {:<14} │ {}",
            tx.id,
            tx.date,
            amount_str,
            tx.category.display_name(),
            truncate(&tx.description, 35)
        );
    }

    Ok(())
}
