//! Test utilities for gastos-core
//!
//! A mock Ollama server that answers extraction prompts with canned JSON, and
//! an in-memory transaction store that can be told to reject chosen batches.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::amount::find_amount;
use crate::categorize::longest_keyword_match;
use crate::db::TransactionStore;
use crate::error::{Error, Result};
use crate::models::{Category, NewTransaction, PersistedTransaction};
use crate::text::fold;

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));
        Self::serve(app).await
    }

    /// Start a server whose generate endpoint answers 200 with a body that is
    /// not a generate response
    pub async fn start_malformed() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route(
                "/api/generate",
                post(|| async { Json(serde_json::json!({ "unexpected": true })) }),
            );
        Self::serve(app).await
    }

    async fn serve(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            size: 2_000_000_000,
        }],
    })
}

/// Answers like a well-behaved model would for the extraction prompt
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let utterance = utterance_from_prompt(&request.prompt);
    let folded = fold(&utterance);

    let response = match find_amount(&utterance) {
        None => r#"{"amount": 0}"#.to_string(),
        Some(amount) => {
            let income = ["recebi", "ganhei", "salario"]
                .iter()
                .any(|cue| folded.contains(cue));
            let category = longest_keyword_match(&folded)
                .map(|t| t.category)
                .unwrap_or(Category::DEFAULT);
            // Wrapped in prose and a code fence, as small local models tend to answer
            format!(
                "Claro! Aqui está:\n```json\n{}\n```",
                serde_json::json!({
                    "amount": amount,
                    "type": if income { "income" } else { "expense" },
                    "category": category.as_str(),
                    "date": null,
                    "description": utterance,
                    "isSaving": false,
                    "savingGoal": null,
                })
            )
        }
    };

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

/// Pull the utterance out of the user section (`Frase: "..."`)
fn utterance_from_prompt(prompt: &str) -> String {
    const MARKER: &str = "Frase: \"";
    match prompt.find(MARKER) {
        Some(start) => {
            let rest = &prompt[start + MARKER.len()..];
            let end = rest.rfind('"').unwrap_or(rest.len());
            rest[..end].to_string()
        }
        None => prompt.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

/// In-memory store that rejects the batches whose call index is listed
///
/// Batches are numbered by call order starting at zero.
#[derive(Default)]
pub struct FlakyStore {
    failing: HashSet<usize>,
    calls: AtomicUsize,
    rows: Mutex<Vec<PersistedTransaction>>,
}

impl FlakyStore {
    /// Store that accepts everything
    pub fn reliable() -> Self {
        Self::default()
    }

    pub fn failing_batches(indexes: &[usize]) -> Self {
        Self {
            failing: indexes.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Number of `insert_many` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Rows persisted so far, in insertion order
    pub fn rows(&self) -> Vec<PersistedTransaction> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TransactionStore for FlakyStore {
    async fn insert_many(&self, rows: &[NewTransaction]) -> Result<Vec<PersistedTransaction>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&call) {
            return Err(Error::Store(format!("simulated failure on batch {}", call)));
        }

        let mut stored = self
            .rows
            .lock()
            .map_err(|_| Error::Store("store lock poisoned".into()))?;
        let mut persisted = Vec::with_capacity(rows.len());
        for row in rows {
            let transaction = PersistedTransaction {
                id: (stored.len() + 1) as i64,
                owner_id: row.owner_id.clone(),
                date: row.date,
                description: row.description.clone(),
                amount: row.amount,
                transaction_type: row.transaction_type,
                category: row.category,
                created_at: Utc::now(),
            };
            stored.push(transaction.clone());
            persisted.push(transaction);
        }
        Ok(persisted)
    }
}
