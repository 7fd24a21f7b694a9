//! Expense/income classification
//!
//! Trigger words decide deterministically; the model's opinion is only a
//! tie-breaker when the text says nothing either way.

use tracing::debug;

use crate::categories::{EXPENSE_TRIGGERS, INCOME_TRIGGERS};
use crate::models::TransactionType;
use crate::text::{first_match, fold};

/// Classify a transaction as expense or income
///
/// Precedence: any expense trigger, then any income trigger, then a
/// recognized model suggestion, then expense.
pub fn classify_type(text: &str, model_suggestion: Option<&str>) -> TransactionType {
    let folded = fold(text);

    if let Some(trigger) = first_match(&folded, EXPENSE_TRIGGERS) {
        debug!(trigger, "Expense trigger matched");
        return TransactionType::Expense;
    }

    if let Some(trigger) = first_match(&folded, INCOME_TRIGGERS) {
        debug!(trigger, "Income trigger matched");
        return TransactionType::Income;
    }

    if let Some(suggested) = model_suggestion.and_then(suggestion_type) {
        debug!(suggestion = %suggested, "Using model type suggestion");
        return suggested;
    }

    TransactionType::Expense
}

fn suggestion_type(label: &str) -> Option<TransactionType> {
    match fold(label).as_str() {
        "expense" | "despesa" => Some(TransactionType::Expense),
        "income" | "receita" => Some(TransactionType::Income),
        _ => None,
    }
}
