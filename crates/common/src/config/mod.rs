//! Configuration management for the CampusFAQ engine
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Reranker service configuration
    #[serde(default)]
    pub reranker: RerankerConfig,

    /// Answer generator (LLM) configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Coarse retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Dialogue orchestration configuration
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Index artifact configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: http, mock
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API key for the embedding service
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_embedding_base")]
    pub api_base: String,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries per request
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Pause between index-build requests in milliseconds (rate limiting)
    #[serde(default = "default_build_pause_ms")]
    pub build_pause_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RerankerConfig {
    /// Whether reranking is enabled; when false the coarse order passes
    /// through unchanged
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// API key for the reranker service
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_reranker_base")]
    pub api_base: String,

    /// Number of final results after reranking
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// API key for the LLM service
    pub api_key: Option<String>,

    /// Chat-completions endpoint
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Number of candidates from the coarse search
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DialogueConfig {
    /// Policy for turns with no grounding: "clarify" (ask the user to
    /// narrow the topic) or "generate" (ungrounded fallback generation).
    /// The two are mutually exclusive interpretations of the same
    /// empty-result condition, selected per deployment.
    #[serde(default = "default_fallback_policy")]
    pub fallback_policy: String,

    /// Queries with fewer tokens than this are expanded before embedding
    #[serde(default = "default_min_query_tokens")]
    pub min_query_tokens: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Path to the persisted index artifact
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,

    /// Path to the corpus file consumed by the indexer
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_provider() -> String { "http".to_string() }
fn default_embedding_base() -> String { "https://llm.alem.ai/v1".to_string() }
fn default_embedding_model() -> String { "text-1024".to_string() }
fn default_embedding_dimension() -> usize { 1024 }
fn default_timeout() -> u64 { 60 }
fn default_retries() -> u32 { 3 }
fn default_build_pause_ms() -> u64 { 1100 }
fn default_enabled() -> bool { true }
fn default_reranker_base() -> String { "https://reranker-llm.alem.ai/v1".to_string() }
fn default_top_n() -> usize { 3 }
fn default_generation_endpoint() -> String {
    "https://llm.alem.ai/v1/chat/completions".to_string()
}
fn default_generation_model() -> String { "alemllm".to_string() }
fn default_top_k() -> usize { 20 }
fn default_fallback_policy() -> String { "clarify".to_string() }
fn default_min_query_tokens() -> usize { 3 }
fn default_artifact_path() -> String { "data/faq_index.json".to_string() }
fn default_corpus_path() -> String { "data/faq_corpus.json".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }
fn default_service_name() -> String { "campusfaq".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__RETRIEVAL__TOP_K=30
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the embedding request timeout as Duration
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding.timeout_secs)
    }

    /// Get the pause between index-build embedding calls as Duration
    pub fn build_pause(&self) -> Duration {
        Duration::from_millis(self.embedding.build_pause_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            reranker: RerankerConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            dialogue: DialogueConfig::default(),
            index: IndexConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            api_base: default_embedding_base(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            build_pause_ms: default_build_pause_ms(),
        }
    }
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: None,
            api_base: default_reranker_base(),
            top_n: default_top_n(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_generation_endpoint(),
            model: default_generation_model(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: default_top_k() }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            fallback_policy: default_fallback_policy(),
            min_query_tokens: default_min_query_tokens(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            corpus_path: default_corpus_path(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            service_name: default_service_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.retrieval.top_k, 20);
        assert_eq!(config.reranker.top_n, 3);
        assert_eq!(config.embedding.model, "text-1024");
        assert_eq!(config.embedding.dimension, 1024);
        assert_eq!(config.dialogue.fallback_policy, "clarify");
        assert_eq!(config.dialogue.min_query_tokens, 3);
    }

    #[test]
    fn test_timeouts_as_durations() {
        let config = AppConfig::default();
        assert_eq!(config.embedding_timeout(), Duration::from_secs(60));
        assert_eq!(config.build_pause(), Duration::from_millis(1100));
    }
}
