//! Completion response types
//!
//! These types are backend-agnostic. Every field the model sends is optional:
//! the extractor normalizes and fills gaps, it never trusts the shape.

use serde::{Deserialize, Serialize};

use crate::models::RawAmount;

/// One transaction object as written by the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelTransaction {
    #[serde(default)]
    pub amount: Option<RawAmount>,
    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_saving: Option<bool>,
    #[serde(default)]
    pub saving_goal: Option<String>,
}

/// The model answers with one object or an array of them
///
/// Variant order matters for untagged matching: `Single` accepts any object,
/// so the wrapped form must be tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResponse {
    Many(Vec<ModelTransaction>),
    Wrapped { transactions: Vec<ModelTransaction> },
    Single(ModelTransaction),
}

impl ExtractionResponse {
    pub fn into_transactions(self) -> Vec<ModelTransaction> {
        match self {
            Self::Many(items) => items,
            Self::Wrapped { transactions } => transactions,
            Self::Single(item) => vec![item],
        }
    }
}

/// Backend identity for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub kind: &'static str,
    pub model: String,
    pub host: String,
}
