//! Custom error types for ledgerlens

use crate::chunk::ChunkRecord;
use thiserror::Error;

/// Main error type for ledgerlens operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Query expansion error: {0}")]
    Expansion(String),

    /// Reranking backend failed. Carries the surviving candidate set in
    /// stage order so the caller can still serve a degraded, unranked
    /// response.
    #[error("Reranker unavailable: {reason}")]
    RerankUnavailable {
        reason: String,
        fallback: Vec<ChunkRecord>,
    },

    #[error("{service} timed out")]
    Timeout { service: String },

    #[error("Cancelled before stage: {0}")]
    Cancelled(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Not initialized: run 'ledgerlens init' first")]
    NotInitialized,

    #[error("Already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// Result type alias for ledgerlens
pub type Result<T> = std::result::Result<T, Error>;

/// Convert qdrant errors
impl From<qdrant_client::QdrantError> for Error {
    fn from(err: qdrant_client::QdrantError) -> Self {
        Error::Store(err.to_string())
    }
}

impl Error {
    /// Map a reqwest failure to the timeout variant when the request hit
    /// its deadline, otherwise keep the transport error.
    pub fn from_reqwest(service: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout {
                service: service.to_string(),
            }
        } else {
            Error::Http(err)
        }
    }
}
