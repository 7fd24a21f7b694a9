//! Model-backed extraction
//!
//! Sends the utterance to the completion backend and normalizes whatever
//! comes back. The model's output is advice: trigger words still decide the
//! type, unknown categories are re-inferred, dates are re-normalized.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::ai::{CompletionBackend, CompletionClient, ModelTransaction};
use crate::amount::parse_amount;
use crate::categories::DEFAULT_SAVING_GOAL;
use crate::categorize::{infer_category_with_trace, CategoryHeuristic};
use crate::classify::classify_type;
use crate::dates::normalize_date;
use crate::error::{Error, Result};
use crate::models::{sanitize_description, CandidateTransaction, Category, RawAmount};

use super::{ExtractionSource, ExtractionStrategy, FallbackReason, StrategyOutcome};

/// Completion-service strategy
pub struct ModelStrategy {
    client: CompletionClient,
    heuristic: CategoryHeuristic,
    strict: bool,
}

impl ModelStrategy {
    pub fn new(client: CompletionClient, heuristic: CategoryHeuristic, strict: bool) -> Self {
        Self {
            client,
            heuristic,
            strict,
        }
    }
}

#[async_trait]
impl ExtractionStrategy for ModelStrategy {
    fn source(&self) -> ExtractionSource {
        ExtractionSource::Model
    }

    async fn extract(&self, text: &str, reference: NaiveDate) -> Result<StrategyOutcome> {
        let response = match self.client.extract_transactions(text, reference).await {
            Ok(response) => response,
            Err(e) if e.is_transport() => {
                if self.strict {
                    return Err(Error::CompletionUnavailable(e.to_string()));
                }
                warn!(host = %self.client.host(), error = %e, "Completion service unavailable");
                return Ok(StrategyOutcome::Declined(FallbackReason::Unavailable(
                    e.to_string(),
                )));
            }
            Err(e) => {
                warn!(model = %self.client.model(), error = %e, "Unusable completion response");
                return Ok(StrategyOutcome::Declined(FallbackReason::InvalidResponse(
                    e.to_string(),
                )));
            }
        };

        let items = response.into_transactions();
        let single = items.len() == 1;

        let candidates: Vec<CandidateTransaction> = items
            .into_iter()
            .filter_map(|item| normalize_item(item, text, single, reference, &self.heuristic))
            .collect();

        if candidates.is_empty() {
            warn!("Completion response has no usable amount");
            return Ok(StrategyOutcome::Declined(FallbackReason::NoUsableAmount));
        }

        debug!(count = candidates.len(), "Model extraction");
        Ok(StrategyOutcome::Extracted(candidates))
    }
}

/// Amount from a model field: number or lenient string, made positive
pub fn model_amount(amount: Option<&RawAmount>) -> Option<f64> {
    let value = match amount? {
        RawAmount::Number(n) => *n,
        RawAmount::Text(s) => parse_amount(s)?,
    };
    let value = value.abs();
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Normalize one model element; `None` when it has no usable amount
///
/// For a single-element answer the whole utterance is the best context for
/// type triggers. In a multi-element answer the utterance mixes every
/// element's verbs, so each element is classified on its own description.
fn normalize_item(
    item: ModelTransaction,
    utterance: &str,
    single: bool,
    reference: NaiveDate,
    heuristic: &CategoryHeuristic,
) -> Option<CandidateTransaction> {
    let amount = model_amount(item.amount.as_ref())?;

    let description = item
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(utterance);

    let type_context = if single { utterance } else { description };
    let transaction_type = classify_type(type_context, item.transaction_type.as_deref());

    let category = match item.category.as_deref().and_then(Category::from_label) {
        Some(category) => category,
        None => {
            let inference =
                infer_category_with_trace(description, amount, transaction_type, heuristic);
            debug!(
                suggested = ?item.category,
                category = %inference.category,
                source = ?inference.source,
                "Model category not in closed set, inferred"
            );
            inference.category
        }
    };

    let date = match item.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(model_date) => normalize_date(model_date, reference),
        None => normalize_date(utterance, reference),
    };

    let is_saving = item.is_saving.unwrap_or(false);
    let saving_goal = if is_saving {
        Some(
            item.saving_goal
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| DEFAULT_SAVING_GOAL.to_string()),
        )
    } else {
        None
    };

    Some(CandidateTransaction {
        amount,
        transaction_type,
        category: category.as_str().to_string(),
        date,
        description: sanitize_description(description),
        is_saving,
        saving_goal,
        selected: true,
    })
}
