//! Offline index build
//!
//! Builds one artifact entry per FAQ record by canonicalizing the record
//! and embedding the result. The build runs against an external,
//! rate-limited embedding service, so it:
//! - skips (and logs) entries the service cannot embed instead of aborting,
//! - optionally pauses between requests,
//! - can resume from a previously saved artifact prefix.
//!
//! Given a deterministic embedding service the build is idempotent: the
//! builder itself introduces no non-determinism.

use crate::artifact::IndexArtifact;
use campusfaq_common::embeddings::Embedder;
use campusfaq_common::errors::{FaqError, Result};
use campusfaq_common::records::FaqRecord;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Builder for the index artifact
pub struct IndexBuilder {
    pause_between_requests: Option<Duration>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            pause_between_requests: None,
        }
    }

    /// Pause inserted between embedding calls (upstream rate limits)
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause_between_requests = Some(pause);
        self
    }

    /// Build an artifact from scratch
    pub async fn build(
        &self,
        records: &[FaqRecord],
        embedder: &dyn Embedder,
    ) -> Result<IndexArtifact> {
        self.resume(IndexArtifact::default(), records, embedder).await
    }

    /// Build an artifact, reusing vectors already present in `existing`.
    ///
    /// Records whose canonicalized text is already in the existing artifact
    /// keep their stored vector; only the remainder is embedded. Output
    /// order always follows `records`, so a resumed build produces the same
    /// artifact as an uninterrupted one.
    pub async fn resume(
        &self,
        existing: IndexArtifact,
        records: &[FaqRecord],
        embedder: &dyn Embedder,
    ) -> Result<IndexArtifact> {
        existing.validate()?;

        // Duplicate canonicalized text makes text->record resolution
        // ambiguous; reject the corpus at build time.
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if let Some(&first) = seen.get(&record.document_text()) {
                return Err(FaqError::DuplicateDocumentText { first, second: i });
            }
            seen.insert(record.document_text(), i);
        }

        let mut cached: HashMap<String, Vec<f32>> = existing
            .document_texts
            .into_iter()
            .zip(existing.vectors)
            .collect();

        info!(
            records = records.len(),
            cached = cached.len(),
            model = embedder.model_name(),
            "Building index artifact"
        );

        let mut artifact = IndexArtifact::default();
        let mut skipped = 0usize;

        for (i, record) in records.iter().enumerate() {
            let text = record.document_text();

            let vector = match cached.remove(&text) {
                Some(vector) => Some(vector),
                None => {
                    let result = embedder.embed(&text).await;
                    if let Some(pause) = self.pause_between_requests {
                        tokio::time::sleep(pause).await;
                    }
                    match result {
                        Ok(vector) => {
                            metrics::counter!("campusfaq_index_entries_built_total")
                                .increment(1);
                            Some(vector)
                        }
                        Err(e) => {
                            // Entry-skip, not pipeline-abort
                            warn!(
                                record = i,
                                error = %e,
                                "Embedding failed, skipping record"
                            );
                            metrics::counter!("campusfaq_index_entries_skipped_total")
                                .increment(1);
                            skipped += 1;
                            None
                        }
                    }
                }
            };

            if let Some(vector) = vector {
                artifact.document_texts.push(text);
                artifact.vectors.push(vector);
                artifact.records.push(record.clone());
            }
        }

        artifact.validate()?;

        info!(
            entries = artifact.len(),
            skipped,
            "Index build finished"
        );
        Ok(artifact)
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Deterministic embedder that fails on configured texts and records
    /// every embed call it receives.
    struct ScriptedEmbedder {
        fail_on: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedEmbedder {
        fn new() -> Self {
            Self {
                fail_on: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(texts: &[&str]) -> Self {
            Self {
                fail_on: texts.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Embedder for ScriptedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.lock().unwrap().push(text.to_string());
            if self.fail_on.iter().any(|f| text.contains(f)) {
                return Err(FaqError::Embedding {
                    message: "scripted failure".into(),
                });
            }
            // Stable per-text vector so builds are reproducible
            let sum: u32 = text.bytes().map(u32::from).sum();
            Ok(vec![sum as f32, text.len() as f32])
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn corpus() -> Vec<FaqRecord> {
        vec![
            FaqRecord::new("Сколько стоит обучение?", "1.2 млн тенге."),
            FaqRecord::new("Есть ли общежитие?", "Да, есть."),
            FaqRecord::new("Какие есть гранты?", "Государственные и внутренние."),
        ]
    }

    #[tokio::test]
    async fn test_build_one_entry_per_record() {
        let embedder = ScriptedEmbedder::new();
        let artifact = IndexBuilder::new().build(&corpus(), &embedder).await.unwrap();

        assert_eq!(artifact.len(), 3);
        assert_eq!(artifact.document_texts[0], corpus()[0].document_text());
        artifact.validate().unwrap();
    }

    #[tokio::test]
    async fn test_failed_embedding_skips_entry_only() {
        let embedder = ScriptedEmbedder::failing_on(&["общежитие"]);
        let artifact = IndexBuilder::new().build(&corpus(), &embedder).await.unwrap();

        assert_eq!(artifact.len(), 2);
        assert!(artifact
            .records
            .iter()
            .all(|r| !r.question.contains("общежитие")));
    }

    #[tokio::test]
    async fn test_build_is_idempotent() {
        let embedder = ScriptedEmbedder::new();
        let builder = IndexBuilder::new();

        let first = builder.build(&corpus(), &embedder).await.unwrap();
        let second = builder.build(&corpus(), &embedder).await.unwrap();

        assert_eq!(first.document_texts, second.document_texts);
        assert_eq!(first.vectors, second.vectors);
        assert_eq!(first.records, second.records);
    }

    #[tokio::test]
    async fn test_resume_skips_already_embedded_prefix() {
        let embedder = ScriptedEmbedder::new();
        let builder = IndexBuilder::new();

        let prefix = builder.build(&corpus()[..2], &embedder).await.unwrap();
        let calls_before = embedder.call_count();

        let full = builder.resume(prefix, &corpus(), &embedder).await.unwrap();

        assert_eq!(full.len(), 3);
        // Only the third record needed an embedding call
        assert_eq!(embedder.call_count() - calls_before, 1);

        // Resumed build matches a from-scratch build
        let fresh = builder.build(&corpus(), &ScriptedEmbedder::new()).await.unwrap();
        assert_eq!(full.vectors, fresh.vectors);
    }

    #[tokio::test]
    async fn test_duplicate_corpus_text_rejected_at_build_time() {
        let mut records = corpus();
        records.push(records[0].clone());

        let embedder = ScriptedEmbedder::new();
        let err = IndexBuilder::new().build(&records, &embedder).await.unwrap_err();
        assert!(matches!(
            err,
            FaqError::DuplicateDocumentText { first: 0, second: 3 }
        ));
    }
}
