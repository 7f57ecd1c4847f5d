//! Persisted index artifact and the in-memory vector index
//!
//! The artifact is the only on-disk state the engine depends on: three
//! positionally aligned collections (document texts, vectors, records).
//! Loading validates the alignment invariant, vector dimensions, and
//! document-text uniqueness before any traffic is served - a corrupt index
//! must abort startup, not answer queries.

use campusfaq_common::errors::{FaqError, Result};
use campusfaq_common::records::FaqRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// On-disk index artifact: three positionally aligned collections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexArtifact {
    /// Canonicalized document texts, in index order
    pub document_texts: Vec<String>,

    /// Embedding vectors, aligned with `document_texts`
    pub vectors: Vec<Vec<f32>>,

    /// Source records, aligned with `document_texts`
    pub records: Vec<FaqRecord>,
}

impl IndexArtifact {
    /// Number of entries
    pub fn len(&self) -> usize {
        self.document_texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_texts.is_empty()
    }

    /// Validate the three-collection alignment, uniform vector dimension,
    /// and document-text uniqueness
    pub fn validate(&self) -> Result<()> {
        if self.vectors.len() != self.document_texts.len()
            || self.records.len() != self.document_texts.len()
        {
            return Err(FaqError::CorpusInvariant {
                message: format!(
                    "misaligned collections: {} texts, {} vectors, {} records",
                    self.document_texts.len(),
                    self.vectors.len(),
                    self.records.len()
                ),
            });
        }

        if let Some(first) = self.vectors.first() {
            let dimension = first.len();
            for vector in &self.vectors {
                if vector.len() != dimension {
                    return Err(FaqError::DimensionMismatch {
                        expected: dimension,
                        actual: vector.len(),
                    });
                }
            }
        }

        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(self.document_texts.len());
        for (i, text) in self.document_texts.iter().enumerate() {
            if let Some(&first) = seen.get(text.as_str()) {
                return Err(FaqError::DuplicateDocumentText { first, second: i });
            }
            seen.insert(text, i);
        }

        Ok(())
    }

    /// Load and validate an artifact from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FaqError::ArtifactNotFound {
                    path: path.display().to_string(),
                }
            } else {
                FaqError::Io(e)
            }
        })?;

        let artifact: IndexArtifact = serde_json::from_slice(&bytes)?;
        artifact.validate()?;

        tracing::info!(
            path = %path.display(),
            entries = artifact.len(),
            "Index artifact loaded"
        );
        Ok(artifact)
    }

    /// Write the artifact atomically (temp file + rename)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;

        let bytes = serde_json::to_vec(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;

        tracing::info!(
            path = %path.display(),
            entries = self.len(),
            "Index artifact saved"
        );
        Ok(())
    }
}

/// One entry of the in-memory index
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// The canonicalized text that was actually embedded
    pub document_text: String,

    /// Embedding vector
    pub vector: Vec<f32>,

    /// The source FAQ record
    pub record: FaqRecord,
}

/// Immutable, process-wide, read-only vector index.
///
/// Built once from a validated artifact; shared behind `Arc` with no
/// locking because nothing mutates it after construction.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
}

impl VectorIndex {
    /// Build the in-memory index from a validated artifact
    pub fn from_artifact(artifact: IndexArtifact) -> Result<Self> {
        artifact.validate()?;

        let dimension = artifact.vectors.first().map(|v| v.len()).unwrap_or(0);
        let entries = artifact
            .document_texts
            .into_iter()
            .zip(artifact.vectors)
            .zip(artifact.records)
            .map(|((document_text, vector), record)| IndexEntry {
                document_text,
                vector,
                record,
            })
            .collect();

        Ok(Self { entries, dimension })
    }

    /// Load the index directly from an artifact file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_artifact(IndexArtifact::load(path)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension (0 for an empty index)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&IndexEntry> {
        self.entries.get(index)
    }

    /// Exact-match lookup from canonicalized text back to its entry.
    ///
    /// Returns the first match; duplicates cannot occur after validation.
    pub fn find_by_text(&self, text: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.document_text == text)
    }
}
