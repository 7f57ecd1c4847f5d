//! Reranker service abstraction
//!
//! Second-stage relevance scoring over a small candidate set. The engine
//! does not implement reranking itself; it defines the contract the
//! downstream logic depends on: given a query and an ordered list of
//! candidate document texts, return the top-N texts by finer relevance.
//! Returning fewer than N (including zero) is a valid outcome, not a
//! failure.

use crate::config::RerankerConfig;
use crate::errors::{FaqError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Trait for candidate reranking
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Reorder `documents` by relevance to `query` and return the top `top_n`.
    ///
    /// The returned texts are an ordered subset of `documents`.
    async fn rerank(&self, query: &str, documents: &[String], top_n: usize)
        -> Result<Vec<String>>;
}

/// HTTP reranker client for `/rerank` endpoints
pub struct HttpReranker {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    #[serde(default)]
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    document: RerankDocument,
}

#[derive(Deserialize)]
struct RerankDocument {
    text: String,
}

impl HttpReranker {
    /// Create a new HTTP reranker from configuration
    pub fn new(config: &RerankerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FaqError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            api_base: config.api_base.clone(),
        })
    }
}

#[async_trait]
impl Reranker for HttpReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/rerank", self.api_base);
        let request = RerankRequest { query, documents, top_n };

        metrics::counter!("campusfaq_rerank_requests_total").increment(1);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                metrics::counter!("campusfaq_rerank_errors_total").increment(1);
                FaqError::Rerank {
                    message: format!("Request failed: {}", e),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            metrics::counter!("campusfaq_rerank_errors_total").increment(1);
            return Err(FaqError::Rerank {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: RerankResponse =
            response.json().await.map_err(|e| FaqError::Rerank {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(result
            .results
            .into_iter()
            .map(|r| r.document.text)
            .collect())
    }
}

/// Reranker that preserves the coarse order.
///
/// Consolidates the deployments that run without a reranking service: the
/// first `top_n` candidates pass through unchanged, so "no reranker" is a
/// configuration choice rather than a separate pipeline.
pub struct PassthroughReranker;

#[async_trait]
impl Reranker for PassthroughReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<String>> {
        Ok(documents.iter().take(top_n).cloned().collect())
    }
}

/// Create a reranker based on configuration
pub fn create_reranker(config: &RerankerConfig) -> Result<Arc<dyn Reranker>> {
    if config.enabled {
        Ok(Arc::new(HttpReranker::new(config)?))
    } else {
        Ok(Arc::new(PassthroughReranker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_preserves_order_and_truncates() {
        let reranker = PassthroughReranker;
        let docs = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let top = reranker.rerank("query", &docs, 2).await.unwrap();
        assert_eq!(top, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_passthrough_top_n_larger_than_input() {
        let reranker = PassthroughReranker;
        let docs = vec!["a".to_string()];

        let top = reranker.rerank("query", &docs, 3).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn test_passthrough_empty_input() {
        let reranker = PassthroughReranker;
        let top = reranker.rerank("query", &[], 3).await.unwrap();
        assert!(top.is_empty());
    }
}
