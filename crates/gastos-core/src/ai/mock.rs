//! Mock backend for testing
//!
//! Useful for unit tests and development without a running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::amount::find_amount;
use crate::error::{Error, Result};
use crate::models::RawAmount;

use super::parsing::parse_extraction;
use super::types::{ExtractionResponse, ModelTransaction};
use super::CompletionBackend;

#[derive(Debug, Clone)]
enum MockBehavior {
    /// One transaction with the first amount found and the text as description
    Echo,
    /// Raw model output, run through the real response parser
    Respond(String),
    /// Every request fails like an unreachable server
    Unavailable,
}

/// Mock completion backend
#[derive(Debug, Clone)]
pub struct MockBackend {
    pub healthy: bool,
    behavior: MockBehavior,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Healthy mock that echoes the utterance back as one transaction
    pub fn new() -> Self {
        Self {
            healthy: true,
            behavior: MockBehavior::Echo,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mock that answers every request with `raw` as the model output
    pub fn with_response(raw: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Respond(raw.into()),
            ..Self::new()
        }
    }

    /// Mock whose requests fail at the transport level
    pub fn unavailable() -> Self {
        Self {
            healthy: false,
            behavior: MockBehavior::Unavailable,
            ..Self::new()
        }
    }

    /// Number of extraction requests served so far (shared across clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn extract_transactions(
        &self,
        text: &str,
        _reference: NaiveDate,
    ) -> Result<ExtractionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Echo => Ok(ExtractionResponse::Single(ModelTransaction {
                amount: Some(RawAmount::Number(find_amount(text).unwrap_or(0.0))),
                description: Some(text.trim().to_string()),
                ..Default::default()
            })),
            MockBehavior::Respond(raw) => parse_extraction(raw),
            MockBehavior::Unavailable => Err(Error::CompletionUnavailable(
                "mock backend is unavailable".into(),
            )),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
