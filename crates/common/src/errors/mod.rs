//! Error types for the CampusFAQ engine
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - A split between fatal corpus errors and per-turn recoverable errors
//! - Structured conversions from transport and serialization errors

use thiserror::Error;

/// Result type alias using FaqError
pub type Result<T> = std::result::Result<T, FaqError>;

/// Application error types
#[derive(Error, Debug)]
pub enum FaqError {
    // Corpus / artifact errors - fatal at startup, serving must not begin
    #[error("Index artifact not found: {path}")]
    ArtifactNotFound { path: String },

    #[error("Corpus invariant violated: {message}")]
    CorpusInvariant { message: String },

    #[error("Duplicate canonicalized document text at indices {first} and {second}")]
    DuplicateDocumentText { first: usize, second: usize },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // Retrieval-service errors - recovered per turn as an empty result
    #[error("Embedding service error: {message}")]
    Embedding { message: String },

    #[error("Embedding timeout after {timeout_ms}ms")]
    EmbeddingTimeout { timeout_ms: u64 },

    #[error("Reranker service error: {message}")]
    Rerank { message: String },

    // Generation-service errors - recovered with a degraded reply
    #[error("Answer generation error: {message}")]
    Generation { message: String },

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl FaqError {
    /// True for failures of the retrieval services (embedding, reranking).
    ///
    /// The orchestrator recovers from these by treating the turn as an
    /// empty retrieval result instead of surfacing an error to the user.
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            FaqError::Embedding { .. }
                | FaqError::EmbeddingTimeout { .. }
                | FaqError::Rerank { .. }
                | FaqError::HttpClient(_)
        )
    }

    /// True for corpus or artifact problems that must abort startup.
    pub fn is_fatal_corpus_error(&self) -> bool {
        matches!(
            self,
            FaqError::ArtifactNotFound { .. }
                | FaqError::CorpusInvariant { .. }
                | FaqError::DuplicateDocumentText { .. }
                | FaqError::DimensionMismatch { .. }
        )
    }
}
