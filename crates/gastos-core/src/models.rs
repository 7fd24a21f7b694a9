//! Domain models for Gastos

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::text::fold;

/// Maximum description length (in characters) accepted by the store
pub const DESCRIPTION_MAX_CHARS: usize = 255;

/// Description used when nothing usable was extracted
pub const DESCRIPTION_PLACEHOLDER: &str = "Transação";

/// Closed set of transaction categories
///
/// Declaration order matters: it is the tie-break order when two dictionary
/// terms of equal length point at different categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Alimentacao,
    Moradia,
    Transporte,
    Internet,
    Cartao,
    Saude,
    Lazer,
    Compras,
    Investimentos,
    Familia,
    Doacoes,
    Outros,
}

impl Category {
    /// Generic catch-all used when every inference layer comes up empty
    pub const DEFAULT: Category = Category::Compras;

    /// Stable identifier stored in the database and exchanged with the model
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alimentacao => "alimentacao",
            Self::Moradia => "moradia",
            Self::Transporte => "transporte",
            Self::Internet => "internet",
            Self::Cartao => "cartao",
            Self::Saude => "saude",
            Self::Lazer => "lazer",
            Self::Compras => "compras",
            Self::Investimentos => "investimentos",
            Self::Familia => "familia",
            Self::Doacoes => "doacoes",
            Self::Outros => "outros",
        }
    }

    /// Portuguese display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Alimentacao => "Alimentação",
            Self::Moradia => "Moradia",
            Self::Transporte => "Transporte",
            Self::Internet => "Internet",
            Self::Cartao => "Cartão",
            Self::Saude => "Saúde",
            Self::Lazer => "Lazer",
            Self::Compras => "Compras",
            Self::Investimentos => "Investimentos",
            Self::Familia => "Família",
            Self::Doacoes => "Doações",
            Self::Outros => "Outros",
        }
    }

    /// English name, accepted when parsing labels from external sources
    pub fn english_name(&self) -> &'static str {
        match self {
            Self::Alimentacao => "food",
            Self::Moradia => "housing",
            Self::Transporte => "transport",
            Self::Internet => "internet",
            Self::Cartao => "card",
            Self::Saude => "health",
            Self::Lazer => "leisure",
            Self::Compras => "purchases",
            Self::Investimentos => "investments",
            Self::Familia => "family",
            Self::Doacoes => "donations",
            Self::Outros => "other",
        }
    }

    /// All categories in closed-set order
    pub fn all() -> &'static [Category] {
        &[
            Self::Alimentacao,
            Self::Moradia,
            Self::Transporte,
            Self::Internet,
            Self::Cartao,
            Self::Saude,
            Self::Lazer,
            Self::Compras,
            Self::Investimentos,
            Self::Familia,
            Self::Doacoes,
            Self::Outros,
        ]
    }

    /// Resolve a label to a closed-set member
    ///
    /// Accepts the id, the display name or the English name, ignoring case
    /// and accents. Anything else is not part of the vocabulary.
    pub fn from_label(label: &str) -> Option<Category> {
        let folded = fold(label);
        if folded.is_empty() {
            return None;
        }
        Self::all().iter().copied().find(|c| {
            folded == c.as_str() || folded == fold(c.display_name()) || folded == c.english_name()
        })
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// Parse a type label, including the Portuguese and bank-statement forms
    pub fn from_label(label: &str) -> Option<TransactionType> {
        match fold(label).as_str() {
            "expense" | "despesa" | "gasto" | "saida" | "debit" | "debito" | "d" => {
                Some(Self::Expense)
            }
            "income" | "receita" | "entrada" | "credit" | "credito" | "c" => Some(Self::Income),
            _ => None,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("Unknown transaction type: {}", s))
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_selected() -> bool {
    true
}

/// An extracted transaction awaiting user review
///
/// Candidates have no identity in the store. They may be edited by the user
/// before import, so the import coordinator treats them as untrusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTransaction {
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Category label; the extractor always writes a closed-set id
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub is_saving: bool,
    #[serde(default)]
    pub saving_goal: Option<String>,
    #[serde(default = "default_selected")]
    pub selected: bool,
}

impl CandidateTransaction {
    /// The "nothing understood" sentinel surfaced for manual correction
    pub fn sentinel(date: NaiveDate) -> Self {
        Self {
            amount: 0.0,
            transaction_type: TransactionType::Expense,
            category: Category::DEFAULT.as_str().to_string(),
            date,
            description: DESCRIPTION_PLACEHOLDER.to_string(),
            is_saving: false,
            saving_goal: None,
            selected: true,
        }
    }

    /// Closed-set category, if the label is part of the vocabulary
    pub fn category(&self) -> Option<Category> {
        Category::from_label(&self.category)
    }

    /// Whether the amount is usable for persistence
    pub fn has_valid_amount(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }
}

/// A validated row ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub owner_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: Category,
}

/// A transaction as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedTransaction {
    pub id: i64,
    pub owner_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

/// Amount as delivered by an external extractor: a JSON number or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

/// One row produced by the document extraction step (bank statements)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub date: String,
    pub description: String,
    pub amount: RawAmount,
    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Cap a description at `DESCRIPTION_MAX_CHARS`, never returning an empty string
///
/// Idempotent: sanitizing an already sanitized description is a no-op.
pub fn sanitize_description(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return DESCRIPTION_PLACEHOLDER.to_string();
    }

    match collapsed.char_indices().nth(DESCRIPTION_MAX_CHARS) {
        Some((cut, _)) => collapsed[..cut].trim_end().to_string(),
        None => collapsed,
    }
}
