//! Transaction extraction
//!
//! Turns an utterance into candidate transactions by running an ordered chain
//! of strategies. Each strategy either extracts or declines with a reason; the
//! first one to extract wins. The rule strategy sits last and never declines.
//!
//! ```text
//! text ──► ModelStrategy ──declined──► RuleStrategy
//!               │                          │
//!               ▼                          ▼
//!          Extraction {source: Model}  Extraction {source: Rules, fallback_reason}
//! ```

mod model;
mod rules;

pub use model::{model_amount, ModelStrategy};
pub use rules::{saving_goal, RuleStrategy};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ai::CompletionClient;
use crate::categorize::CategoryHeuristic;
use crate::config::GastosConfig;
use crate::error::Result;
use crate::models::CandidateTransaction;

/// Which strategy produced the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Model,
    Rules,
}

/// Why the model strategy did not produce the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// No completion backend is configured
    NotConfigured,
    /// The backend could not be reached (connection, timeout, HTTP status)
    Unavailable(String),
    /// The backend answered with something that is not a transaction list
    InvalidResponse(String),
    /// The answer parsed but carried no amount above zero
    NoUsableAmount,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "completion service not configured"),
            Self::Unavailable(msg) => write!(f, "completion service unavailable: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "invalid completion response: {}", msg),
            Self::NoUsableAmount => write!(f, "completion response had no usable amount"),
        }
    }
}

/// Result of one strategy
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Extracted(Vec<CandidateTransaction>),
    Declined(FallbackReason),
}

/// A step in the extraction chain
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn source(&self) -> ExtractionSource;

    /// Extract or decline; `Err` aborts the whole chain
    async fn extract(&self, text: &str, reference: NaiveDate) -> Result<StrategyOutcome>;
}

/// Candidates plus how they were obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub candidates: Vec<CandidateTransaction>,
    pub source: ExtractionSource,
    /// Set when the model strategy was skipped or declined
    pub fallback_reason: Option<FallbackReason>,
}

/// Extractor settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractorConfig {
    /// Propagate completion transport failures instead of falling back
    pub strict: bool,
    pub heuristic: CategoryHeuristic,
}

impl From<&GastosConfig> for ExtractorConfig {
    fn from(config: &GastosConfig) -> Self {
        Self {
            strict: config.completion.strict,
            heuristic: config.heuristic.clone(),
        }
    }
}

/// Strategy chain runner
pub struct TransactionExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    model_configured: bool,
}

impl TransactionExtractor {
    /// Model strategy (when a client is given) followed by rules
    pub fn new(client: Option<CompletionClient>, config: ExtractorConfig) -> Self {
        let mut strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();
        let model_configured = client.is_some();
        if let Some(client) = client {
            strategies.push(Box::new(ModelStrategy::new(
                client,
                config.heuristic.clone(),
                config.strict,
            )));
        }
        strategies.push(Box::new(RuleStrategy::new()));
        Self {
            strategies,
            model_configured,
        }
    }

    /// Rules only
    pub fn rules_only() -> Self {
        Self::new(None, ExtractorConfig::default())
    }

    /// Extract candidates from an utterance
    ///
    /// Never fails on content: unintelligible input yields a zero-amount
    /// candidate. Only strict-mode transport failures propagate.
    pub async fn extract(&self, text: &str, reference: NaiveDate) -> Result<Extraction> {
        let mut fallback_reason = (!self.model_configured).then_some(FallbackReason::NotConfigured);

        if text.trim().is_empty() {
            debug!("Empty utterance, returning sentinel candidate");
            return Ok(Extraction {
                candidates: vec![CandidateTransaction::sentinel(reference)],
                source: ExtractionSource::Rules,
                fallback_reason,
            });
        }

        for strategy in &self.strategies {
            match strategy.extract(text, reference).await? {
                StrategyOutcome::Extracted(candidates) => {
                    info!(
                        source = ?strategy.source(),
                        count = candidates.len(),
                        fallback = fallback_reason.is_some(),
                        "Extracted transactions"
                    );
                    return Ok(Extraction {
                        candidates,
                        source: strategy.source(),
                        fallback_reason,
                    });
                }
                StrategyOutcome::Declined(reason) => {
                    warn!(source = ?strategy.source(), reason = %reason, "Strategy declined, trying next");
                    fallback_reason = Some(reason);
                }
            }
        }

        warn!("Every strategy declined, returning sentinel candidate");
        Ok(Extraction {
            candidates: vec![CandidateTransaction::sentinel(reference)],
            source: ExtractionSource::Rules,
            fallback_reason,
        })
    }
}
