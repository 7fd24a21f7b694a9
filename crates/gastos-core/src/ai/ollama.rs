//! Ollama backend implementation
//!
//! HTTP client for the Ollama `/api/generate` endpoint. The system and user
//! sections of the prompt are sent separately.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::prompts::PromptLibrary;

use super::parsing::parse_extraction;
use super::types::ExtractionResponse;
use super::{http_client, render_extraction_prompt, CompletionBackend};

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: http_client(None),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Same backend, every request bounded by `timeout`
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            http_client: http_client(Some(timeout)),
            ..self
        }
    }

    /// Use a specific prompt library (tests use embedded-only)
    pub fn with_prompts(self, prompts: PromptLibrary) -> Self {
        Self {
            prompts: Arc::new(RwLock::new(prompts)),
            ..self
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    system: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    async fn extract_transactions(
        &self,
        text: &str,
        reference: NaiveDate,
    ) -> Result<ExtractionResponse> {
        let rendered = render_extraction_prompt(&self.prompts, text, reference)?;

        let request = GenerateRequest {
            model: self.model.clone(),
            system: rendered.system,
            prompt: rendered.user,
            stream: false,
            options: GenerateOptions { temperature: 0.1 },
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let generated: GenerateResponse = response.json().await?;
        debug!(model = %self.model, "Ollama response: {}", generated.response);

        parse_extraction(&generated.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
