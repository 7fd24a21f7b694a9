//! Gastos Core Library
//!
//! Turns free-form Portuguese money talk into structured transactions:
//! - Completion-service extraction with a rule-based fallback
//! - Layered category inference over a closed category set
//! - Expense/income classification and date normalization
//! - Batch import of reviewed candidates into the transaction store
//! - Prompt library with user overrides

pub mod ai;
pub mod amount;
pub mod categories;
pub mod categorize;
pub mod classify;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod extract;
pub mod import;
pub mod models;
pub mod prompts;
pub mod text;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    BackendInfo, CompletionBackend, CompletionClient, ExtractionResponse, MockBackend,
    ModelTransaction, OllamaBackend, OpenAICompatibleBackend,
};
pub use categorize::{infer_category, infer_category_with_trace, CategoryHeuristic, Inference};
pub use classify::classify_type;
pub use config::GastosConfig;
pub use dates::normalize_date;
pub use db::{Database, TransactionStore};
pub use error::{Error, Result};
pub use extract::{
    Extraction, ExtractionSource, ExtractionStrategy, ExtractorConfig, FallbackReason,
    TransactionExtractor,
};
pub use import::{
    import_batch, import_statement_rows, insert_single, read_statement_csv, FailedBatch,
    ImportOutcome, ImportReport,
};
pub use models::{
    CandidateTransaction, Category, NewTransaction, PersistedTransaction, StatementRow,
    TransactionType,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
