//! Rule-based extraction
//!
//! The last strategy in the chain. It always produces exactly one candidate,
//! even when it understands nothing (amount 0, left for manual correction).

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::amount::find_amount;
use crate::categories::{DEFAULT_SAVING_GOAL, RULE_INCOME_CUES, SAVING_CUES};
use crate::categorize::longest_keyword_match;
use crate::dates::normalize_date;
use crate::error::Result;
use crate::models::{sanitize_description, CandidateTransaction, Category, TransactionType};
use crate::text::{first_match, fold};

use super::{ExtractionSource, ExtractionStrategy, StrategyOutcome};

/// "para a viagem", "pra minha reserva", "em uma moto"
static SAVING_GOAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:para|pra|em)\s+(?:(?:a|o|as|os|um|uma|minha|meu|minhas|meus)\s+)?([^,.;:!?\d]+)",
    )
    .expect("valid regex")
});

/// Keyword-driven fallback extractor
#[derive(Debug, Clone, Default)]
pub struct RuleStrategy;

impl RuleStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Build the single candidate for `text`
    pub fn extract_one(&self, text: &str, reference: NaiveDate) -> CandidateTransaction {
        let folded = fold(text);

        let amount = find_amount(text).unwrap_or(0.0);

        let transaction_type = match first_match(&folded, RULE_INCOME_CUES) {
            Some(_) => TransactionType::Income,
            None => TransactionType::Expense,
        };

        let is_saving = first_match(&folded, SAVING_CUES).is_some();
        let saving_goal = is_saving.then(|| saving_goal(text));

        let category = longest_keyword_match(&folded)
            .map(|term| term.category)
            .unwrap_or(Category::DEFAULT);

        debug!(
            amount,
            transaction_type = %transaction_type,
            category = %category,
            is_saving,
            "Rule extraction"
        );

        CandidateTransaction {
            amount,
            transaction_type,
            category: category.as_str().to_string(),
            date: normalize_date(text, reference),
            description: sanitize_description(text),
            is_saving,
            saving_goal,
            selected: true,
        }
    }
}

#[async_trait]
impl ExtractionStrategy for RuleStrategy {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::Rules
    }

    async fn extract(&self, text: &str, reference: NaiveDate) -> Result<StrategyOutcome> {
        Ok(StrategyOutcome::Extracted(vec![
            self.extract_one(text, reference)
        ]))
    }
}

/// Goal phrase after "para"/"em", else the default goal
pub fn saving_goal(text: &str) -> String {
    SAVING_GOAL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|goal| !goal.is_empty())
        .map(|goal| capitalize(&goal))
        .unwrap_or_else(|| DEFAULT_SAVING_GOAL.to_string())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_basic_expense() {
        let candidate = RuleStrategy::new().extract_one("Gastei 50 reais no mercado ontem", reference());
        assert_eq!(candidate.amount, 50.0);
        assert_eq!(candidate.transaction_type, TransactionType::Expense);
        assert_eq!(candidate.category, "alimentacao");
        assert_eq!(candidate.date, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
        assert!(!candidate.is_saving);
        assert_eq!(candidate.saving_goal, None);
        assert_eq!(candidate.description, "Gastei 50 reais no mercado ontem");
    }

    #[test]
    fn test_leading_date_is_not_the_amount() {
        let candidate =
            RuleStrategy::new().extract_one("05-04-23 paguei 50 reais no mercado", reference());
        assert_eq!(candidate.amount, 50.0);
        assert_eq!(candidate.date, NaiveDate::from_ymd_opt(2023, 4, 5).unwrap());

        let candidate =
            RuleStrategy::new().extract_one("01.02.2024 gastei 80 na farmacia", reference());
        assert_eq!(candidate.amount, 80.0);
        assert_eq!(candidate.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_income_cue() {
        let candidate = RuleStrategy::new().extract_one("Recebi 3 mil de salário", reference());
        assert_eq!(candidate.amount, 3000.0);
        assert_eq!(candidate.transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_saving_goal_extraction() {
        let candidate =
            RuleStrategy::new().extract_one("Guardei 200 para a viagem de férias", reference());
        assert!(candidate.is_saving);
        assert_eq!(candidate.saving_goal.as_deref(), Some("Viagem de férias"));

        let candidate = RuleStrategy::new().extract_one("economizei 80 reais", reference());
        assert!(candidate.is_saving);
        assert_eq!(candidate.saving_goal.as_deref(), Some(DEFAULT_SAVING_GOAL));
    }

    #[test]
    fn test_no_amount_and_no_keyword() {
        let candidate = RuleStrategy::new().extract_one("sei lá o que foi isso", reference());
        assert_eq!(candidate.amount, 0.0);
        assert_eq!(candidate.category, Category::DEFAULT.as_str());
        assert_eq!(candidate.date, reference());
        assert!(candidate.selected);
    }

    #[test]
    fn test_rules_use_keywords_only() {
        // "ifood" is a synonym, not a keyword
        let candidate = RuleStrategy::new().extract_one("pedi 40 no ifood", reference());
        assert_eq!(candidate.category, Category::DEFAULT.as_str());
    }
}
