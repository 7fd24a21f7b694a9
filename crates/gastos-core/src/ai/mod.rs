//! Pluggable completion backend abstraction
//!
//! The extractor asks a language model to turn an utterance into transaction
//! objects. Any of these can serve that request:
//!
//! - `CompletionBackend` trait: the interface the extractor depends on
//! - `CompletionClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)
//!
//! No host configured means no client: the extractor goes straight to rules.

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::Category;
use crate::prompts::{PromptId, PromptLibrary, RenderedPrompt};

/// Interface every completion backend implements
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Ask the model for the transactions in `text`
    ///
    /// Transport problems surface as `Error::Http`/`Error::CompletionUnavailable`,
    /// unusable output as `Error::InvalidData`.
    async fn extract_transactions(
        &self,
        text: &str,
        reference: NaiveDate,
    ) -> Result<ExtractionResponse>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    fn model(&self) -> &str;

    fn host(&self) -> &str;
}

/// Concrete completion client enum
#[derive(Clone)]
pub enum CompletionClient {
    Ollama(OllamaBackend),
    /// Docker Model Runner, vLLM, LocalAI, llama-server, etc.
    OpenAICompatible(OpenAICompatibleBackend),
    Mock(MockBackend),
}

impl CompletionClient {
    /// Create a client from environment variables
    ///
    /// Returns None if the selected backend has no host configured.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(CompletionClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(CompletionClient::OpenAICompatible)
            }
            "mock" => Some(CompletionClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(CompletionClient::Ollama)
            }
        }
    }

    /// Apply a request timeout (mock ignores it)
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            CompletionClient::Ollama(b) => CompletionClient::Ollama(b.with_timeout(timeout)),
            CompletionClient::OpenAICompatible(b) => {
                CompletionClient::OpenAICompatible(b.with_timeout(timeout))
            }
            CompletionClient::Mock(b) => CompletionClient::Mock(b),
        }
    }

    pub fn info(&self) -> BackendInfo {
        let kind = match self {
            CompletionClient::Ollama(_) => "ollama",
            CompletionClient::OpenAICompatible(_) => "openai_compatible",
            CompletionClient::Mock(_) => "mock",
        };
        BackendInfo {
            kind,
            model: self.model().to_string(),
            host: self.host().to_string(),
        }
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    async fn extract_transactions(
        &self,
        text: &str,
        reference: NaiveDate,
    ) -> Result<ExtractionResponse> {
        match self {
            CompletionClient::Ollama(b) => b.extract_transactions(text, reference).await,
            CompletionClient::OpenAICompatible(b) => b.extract_transactions(text, reference).await,
            CompletionClient::Mock(b) => b.extract_transactions(text, reference).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            CompletionClient::Ollama(b) => b.health_check().await,
            CompletionClient::OpenAICompatible(b) => b.health_check().await,
            CompletionClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            CompletionClient::Ollama(b) => b.model(),
            CompletionClient::OpenAICompatible(b) => b.model(),
            CompletionClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            CompletionClient::Ollama(b) => b.host(),
            CompletionClient::OpenAICompatible(b) => b.host(),
            CompletionClient::Mock(b) => b.host(),
        }
    }
}

/// Render the extraction prompt shared by the HTTP backends
pub(crate) fn render_extraction_prompt(
    prompts: &RwLock<PromptLibrary>,
    text: &str,
    reference: NaiveDate,
) -> Result<RenderedPrompt> {
    let today = reference.format("%Y-%m-%d").to_string();
    let categories = Category::all()
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut vars = HashMap::new();
    vars.insert("text", text);
    vars.insert("today", today.as_str());
    vars.insert("categories", categories.as_str());

    let mut prompts = prompts
        .write()
        .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
    prompts.render(PromptId::ExtractTransaction, &vars)
}

/// Build an HTTP client with a request timeout
pub(crate) fn http_client(timeout: Option<Duration>) -> reqwest::Client {
    let builder = reqwest::Client::builder();
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    builder.build().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_client_mock() {
        let client = CompletionClient::Mock(MockBackend::new());
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
        assert_eq!(client.info().kind, "mock");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = CompletionClient::Mock(MockBackend::new());
        assert!(client.health_check().await);
    }

    #[test]
    fn test_extraction_prompt_lists_categories() {
        let prompts = RwLock::new(PromptLibrary::embedded_only());
        let reference = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let rendered = render_extraction_prompt(&prompts, "Gastei 50", reference).unwrap();

        for category in Category::all() {
            assert!(rendered.system.contains(category.as_str()));
        }
        assert!(rendered.system.contains("2024-06-10"));
        assert!(rendered.user.contains("Gastei 50"));
    }
}
