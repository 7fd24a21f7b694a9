//! Category inference
//!
//! Layered assignment, first layer to produce an answer wins:
//! 1. Name match - the description *is* a category (id or display name)
//! 2. Keywords - curated per-category dictionary, longest term first
//! 3. Synonyms - brands, banks and slang, longest term first
//! 4. Heuristic - amount and direction of the money flow
//! 5. Default - the generic catch-all
//!
//! Inference never fails and always returns a closed-set member.

use serde::Serialize;
use tracing::debug;

use crate::categories::{Term, KEYWORD_INDEX, SYNONYM_INDEX};
use crate::models::{Category, TransactionType};
use crate::text::{contains_term, fold};

/// Shortest description that may match as a fragment of a category name
const MIN_NAME_FRAGMENT: usize = 4;

/// Amount/type rules used when no dictionary term matched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryHeuristic {
    /// Income strictly above this is treated as a large inflow
    pub income_threshold: f64,
    /// Expenses at or above this look like rent or a mortgage
    pub housing_threshold: f64,
    /// Expenses at or below this look like a snack
    pub small_expense_threshold: f64,
    pub large_income_category: Category,
    pub small_income_category: Category,
}

impl Default for CategoryHeuristic {
    fn default() -> Self {
        Self {
            income_threshold: 1000.0,
            housing_threshold: 1000.0,
            small_expense_threshold: 30.0,
            large_income_category: Category::Investimentos,
            small_income_category: Category::Outros,
        }
    }
}

impl CategoryHeuristic {
    /// Apply the rules; `None` when the amount carries no signal
    pub fn apply(&self, amount: f64, transaction_type: TransactionType) -> Option<Category> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }

        match transaction_type {
            TransactionType::Income if amount > self.income_threshold => {
                Some(self.large_income_category)
            }
            TransactionType::Income => Some(self.small_income_category),
            TransactionType::Expense if amount >= self.housing_threshold => {
                Some(Category::Moradia)
            }
            TransactionType::Expense if amount <= self.small_expense_threshold => {
                Some(Category::Alimentacao)
            }
            TransactionType::Expense => None,
        }
    }
}

/// Which layer decided a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceSource {
    Name,
    Keyword,
    Synonym,
    Heuristic,
    Default,
}

/// A category together with the layer that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inference {
    pub category: Category,
    pub source: InferenceSource,
}

/// Infer a category with the default heuristic
pub fn infer_category(
    description: &str,
    amount: f64,
    transaction_type: TransactionType,
) -> Category {
    infer_category_with_trace(
        description,
        amount,
        transaction_type,
        &CategoryHeuristic::default(),
    )
    .category
}

/// Infer a category and report which layer decided
pub fn infer_category_with_trace(
    description: &str,
    amount: f64,
    transaction_type: TransactionType,
    heuristic: &CategoryHeuristic,
) -> Inference {
    let folded = fold(description);

    // Layer 1: the description names a category
    if let Some(category) = name_match(&folded) {
        debug!(category = %category, "Category from name match");
        return Inference {
            category,
            source: InferenceSource::Name,
        };
    }

    // Layer 2: curated keywords
    if let Some(term) = longest_keyword_match(&folded) {
        debug!(category = %term.category, term = term.text, "Category from keyword");
        return Inference {
            category: term.category,
            source: InferenceSource::Keyword,
        };
    }

    // Layer 3: synonyms
    if let Some(term) = longest_match(&folded, &SYNONYM_INDEX) {
        debug!(category = %term.category, term = term.text, "Category from synonym");
        return Inference {
            category: term.category,
            source: InferenceSource::Synonym,
        };
    }

    // Layer 4: amount heuristic
    if let Some(category) = heuristic.apply(amount, transaction_type) {
        debug!(category = %category, amount, "Category from amount heuristic");
        return Inference {
            category,
            source: InferenceSource::Heuristic,
        };
    }

    debug!(category = %Category::DEFAULT, "No category signal, using default");
    Inference {
        category: Category::DEFAULT,
        source: InferenceSource::Default,
    }
}

/// Longest keyword term contained in already-folded text
pub fn longest_keyword_match(folded: &str) -> Option<Term> {
    longest_match(folded, &KEYWORD_INDEX)
}

// Indexes are sorted longest first, so the first hit is the most specific
fn longest_match(folded: &str, index: &[Term]) -> Option<Term> {
    index
        .iter()
        .find(|term| contains_term(folded, term.text))
        .copied()
}

fn name_match(folded: &str) -> Option<Category> {
    if folded.is_empty() {
        return None;
    }

    let names = |c: &Category| [c.as_str().to_string(), fold(c.display_name())];

    if let Some(category) = Category::all()
        .iter()
        .find(|c| names(*c).iter().any(|name| name == folded))
    {
        return Some(*category);
    }

    if folded.chars().count() < MIN_NAME_FRAGMENT {
        return None;
    }
    Category::all()
        .iter()
        .find(|c| names(*c).iter().any(|name| name.contains(folded)))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(description: &str, amount: f64, transaction_type: TransactionType) -> Inference {
        infer_category_with_trace(
            description,
            amount,
            transaction_type,
            &CategoryHeuristic::default(),
        )
    }

    #[test]
    fn test_name_match() {
        let inference = trace("Alimentação", 10.0, TransactionType::Expense);
        assert_eq!(inference.category, Category::Alimentacao);
        assert_eq!(inference.source, InferenceSource::Name);

        // Fragment of a category name
        assert_eq!(
            trace("invest", 0.0, TransactionType::Expense).category,
            Category::Investimentos
        );
    }

    #[test]
    fn test_name_match_does_not_swallow_sentences() {
        // Contains "compras" but is about groceries
        let inference = trace("compras no mercado", 120.0, TransactionType::Expense);
        assert_eq!(inference.category, Category::Alimentacao);
        assert_eq!(inference.source, InferenceSource::Keyword);
    }

    #[test]
    fn test_keyword_layer() {
        assert_eq!(
            infer_category("Gastei 50 reais no mercado", 50.0, TransactionType::Expense),
            Category::Alimentacao
        );
        assert_eq!(
            infer_category("paguei o aluguel", 1500.0, TransactionType::Expense),
            Category::Moradia
        );
        assert_eq!(
            infer_category("remédio na farmácia", 40.0, TransactionType::Expense),
            Category::Saude
        );
    }

    #[test]
    fn test_longest_match_wins() {
        assert_eq!(
            infer_category("conta do celular", 80.0, TransactionType::Expense),
            Category::Internet
        );
        assert_eq!(
            infer_category("comprei um celular", 80.0, TransactionType::Expense),
            Category::Compras
        );
        assert_eq!(
            infer_category(
                "fatura do cartão de crédito da loja",
                900.0,
                TransactionType::Expense
            ),
            Category::Cartao
        );
        assert_eq!(
            infer_category("pedido no mercado livre", 90.0, TransactionType::Expense),
            Category::Compras
        );
    }

    #[test]
    fn test_synonym_layer() {
        let inference = trace("pedi no iFood", 45.0, TransactionType::Expense);
        assert_eq!(inference.category, Category::Alimentacao);
        assert_eq!(inference.source, InferenceSource::Synonym);

        assert_eq!(
            trace("assinatura Netflix", 55.9, TransactionType::Expense).category,
            Category::Lazer
        );
    }

    #[test]
    fn test_heuristic_layer() {
        let large = trace("pix do joão", 5000.0, TransactionType::Income);
        assert_eq!(large.category, Category::Investimentos);
        assert_eq!(large.source, InferenceSource::Heuristic);

        assert_eq!(
            trace("pix do joão", 200.0, TransactionType::Income).category,
            Category::Outros
        );
        assert_eq!(
            trace("pix do joão", 1000.0, TransactionType::Expense).category,
            Category::Moradia
        );
        assert_eq!(
            trace("pix do joão", 30.0, TransactionType::Expense).category,
            Category::Alimentacao
        );
    }

    #[test]
    fn test_default_layer() {
        let mid = trace("pix do joão", 200.0, TransactionType::Expense);
        assert_eq!(mid.category, Category::DEFAULT);
        assert_eq!(mid.source, InferenceSource::Default);

        let empty = trace("", 0.0, TransactionType::Income);
        assert_eq!(empty.category, Category::Compras);
        assert_eq!(empty.source, InferenceSource::Default);
    }

    #[test]
    fn test_custom_heuristic() {
        let heuristic = CategoryHeuristic {
            income_threshold: 10_000.0,
            large_income_category: Category::Outros,
            small_income_category: Category::Familia,
            ..Default::default()
        };
        let inference = infer_category_with_trace(
            "pix do joão",
            5000.0,
            TransactionType::Income,
            &heuristic,
        );
        assert_eq!(inference.category, Category::Familia);
    }

    #[test]
    fn test_always_closed_set() {
        for text in ["", "???", "xyz", "pagamento"] {
            for amount in [0.0, -5.0, f64::NAN, 10.0, 99999.0] {
                for ty in [TransactionType::Expense, TransactionType::Income] {
                    let category = infer_category(text, amount, ty);
                    assert!(Category::all().contains(&category));
                }
            }
        }
    }
}
