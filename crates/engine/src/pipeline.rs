//! Two-stage retrieval pipeline
//!
//! embed query -> coarse top-K over the vector index -> rerank top-N ->
//! resolve reranked texts back to records. An empty result is a
//! first-class outcome ("no grounding found"), not an error; service
//! failures propagate to the orchestrator, which degrades them per turn.

use crate::resolver::resolve_contexts;
use campusfaq_common::embeddings::Embedder;
use campusfaq_common::errors::Result;
use campusfaq_common::records::FaqRecord;
use campusfaq_common::rerank::Reranker;
use campusfaq_index::{CoarseSearch, VectorIndex};
use std::sync::Arc;
use tracing::{debug, info};

/// Retrieval pipeline over a shared read-only index
pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    coarse: Arc<dyn CoarseSearch>,
    reranker: Arc<dyn Reranker>,
    index: Arc<VectorIndex>,
    top_k: usize,
    top_n: usize,
}

impl RetrievalPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        coarse: Arc<dyn CoarseSearch>,
        reranker: Arc<dyn Reranker>,
        index: Arc<VectorIndex>,
        top_k: usize,
        top_n: usize,
    ) -> Self {
        Self {
            embedder,
            coarse,
            reranker,
            index,
            top_k,
            top_n,
        }
    }

    /// Run the full pipeline for one query.
    ///
    /// Returns the resolved records in reranker order; empty means no
    /// grounding was found.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<FaqRecord>> {
        let query_vector = self.embedder.embed(query).await?;

        let candidates = self.coarse.search(&query_vector, self.top_k)?;
        debug!(candidates = candidates.len(), top_k = self.top_k, "Coarse search done");

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let candidate_texts: Vec<String> = candidates
            .iter()
            .filter_map(|c| self.index.get(c.index))
            .map(|entry| entry.document_text.clone())
            .collect();

        let reranked = self
            .reranker
            .rerank(query, &candidate_texts, self.top_n)
            .await?;

        let contexts = resolve_contexts(&reranked, &self.index);

        info!(
            coarse = candidate_texts.len(),
            reranked = reranked.len(),
            resolved = contexts.len(),
            "Retrieval finished"
        );

        if contexts.is_empty() {
            metrics::counter!("campusfaq_retrieval_empty_total").increment(1);
        }

        Ok(contexts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use campusfaq_common::errors::FaqError;
    use campusfaq_index::{FullScanRetriever, IndexArtifact};

    /// Embedder keyed on exact query text; unknown text is an error
    struct TableEmbedder {
        table: Vec<(String, Vec<f32>)>,
    }

    #[async_trait]
    impl Embedder for TableEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.table
                .iter()
                .find(|(t, _)| t == text)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| FaqError::Embedding {
                    message: format!("no scripted vector for '{}'", text),
                })
        }

        fn model_name(&self) -> &str {
            "table"
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    /// Reranker that reverses the candidates and truncates to top_n
    struct ReversingReranker;

    #[async_trait]
    impl Reranker for ReversingReranker {
        async fn rerank(
            &self,
            _query: &str,
            documents: &[String],
            top_n: usize,
        ) -> Result<Vec<String>> {
            Ok(documents.iter().rev().take(top_n).cloned().collect())
        }
    }

    /// Reranker that judges nothing relevant
    struct EmptyReranker;

    #[async_trait]
    impl Reranker for EmptyReranker {
        async fn rerank(&self, _q: &str, _d: &[String], _n: usize) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn test_index() -> Arc<VectorIndex> {
        let records = vec![
            FaqRecord::new("Сколько стоит обучение?", "1.2 млн тенге."),
            FaqRecord::new("Есть ли общежитие?", "Да, есть."),
            FaqRecord::new("Какие есть гранты?", "Государственные."),
        ];
        let artifact = IndexArtifact {
            document_texts: records.iter().map(|r| r.document_text()).collect(),
            vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
            records,
        };
        Arc::new(VectorIndex::from_artifact(artifact).unwrap())
    }

    fn pipeline(reranker: Arc<dyn Reranker>) -> RetrievalPipeline {
        let index = test_index();
        let embedder = Arc::new(TableEmbedder {
            table: vec![("стоимость обучения".to_string(), vec![1.0, 0.1])],
        });
        RetrievalPipeline::new(
            embedder,
            Arc::new(FullScanRetriever::new(index.clone())),
            reranker,
            index,
            20,
            3,
        )
    }

    #[tokio::test]
    async fn test_retrieve_resolves_in_reranker_order() {
        let pipeline = pipeline(Arc::new(ReversingReranker));
        let contexts = pipeline.retrieve("стоимость обучения").await.unwrap();

        assert_eq!(contexts.len(), 3);
        // Coarse order for [1.0, 0.1] is [0, 2, 1]; reversed: [1, 2, 0]
        assert_eq!(contexts[0].question, "Есть ли общежитие?");
        assert_eq!(contexts[2].question, "Сколько стоит обучение?");
    }

    #[tokio::test]
    async fn test_reranker_returning_zero_yields_empty_result() {
        // Non-empty coarse set, zero reranked: valid outcome, not an error
        let pipeline = pipeline(Arc::new(EmptyReranker));
        let contexts = pipeline.retrieve("стоимость обучения").await.unwrap();
        assert!(contexts.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let pipeline = pipeline(Arc::new(ReversingReranker));
        let err = pipeline.retrieve("неизвестный запрос").await.unwrap_err();
        assert!(err.is_retrieval_failure());
    }
}
