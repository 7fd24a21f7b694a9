//! Error types for Gastos

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The completion service could not be reached (only surfaced in strict mode)
    #[error("Completion service unavailable: {0}")]
    CompletionUnavailable(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl Error {
    /// Whether this error came from the transport layer rather than from content
    ///
    /// The extractor uses this to tell "service unreachable" apart from
    /// "service answered with something unusable". A body that arrived but
    /// failed to decode is content, not transport.
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Http(e) => !e.is_decode(),
            Error::Io(_) | Error::CompletionUnavailable(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
