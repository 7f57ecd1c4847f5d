//! CampusFAQ Vector Index
//!
//! The immutable, positionally-aligned store of
//! (document text, embedding vector, source record) triples, plus:
//! - Persisted artifact with startup validation
//! - Resumable offline build against a rate-limited embedding service
//! - Coarse full-scan retrieval behind a substitutable search trait

pub mod artifact;
pub mod builder;
pub mod coarse;

pub use artifact::{IndexArtifact, IndexEntry, VectorIndex};
pub use builder::IndexBuilder;
pub use coarse::{cosine_similarity, CoarseSearch, FullScanRetriever, ScoredCandidate};
