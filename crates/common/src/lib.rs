//! CampusFAQ Common Library
//!
//! Shared code for the CampusFAQ retrieval-and-dialogue engine including:
//! - Typed FAQ records and canonicalization
//! - Embedding client abstraction
//! - Reranker client abstraction
//! - Answer generator (LLM) client abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod embeddings;
pub mod errors;
pub mod generation;
pub mod metrics;
pub mod records;
pub mod rerank;

// Re-export commonly used types
pub use config::AppConfig;
pub use embeddings::Embedder;
pub use errors::{FaqError, Result};
pub use generation::AnswerGenerator;
pub use records::FaqRecord;
pub use rerank::Reranker;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-1024";

/// Default embedding dimension
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1024;
