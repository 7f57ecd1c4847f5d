//! CampusFAQ Dialogue Engine
//!
//! The retrieval-and-dialogue orchestration core:
//! - Context Resolver: reranked texts back to structured FAQ records
//! - Retrieval pipeline: embed -> coarse top-K -> rerank top-N -> resolve
//! - ConversationSession: explicit per-conversation state, owned by the
//!   caller and passed into every turn
//! - Dialogue Orchestrator: the two-state machine deciding between a
//!   grounded answer, a clarification request, and an ungrounded fallback
//!
//! The engine is a library: a request-handling shell supplies one user turn
//! and one session per call and gets back one reply plus the mutated
//! session. All collaborators (embedder, coarse search, reranker,
//! generator) are injected - there is no ambient global state.

pub mod orchestrator;
pub mod pipeline;
pub mod resolver;
pub mod session;

pub use orchestrator::{DialogueOrchestrator, FallbackPolicy, Plan, TurnReply};
pub use pipeline::RetrievalPipeline;
pub use resolver::resolve_contexts;
pub use session::{ChatMessage, ConversationSession, DialogueState, Role};

use campusfaq_common::config::AppConfig;
use campusfaq_common::embeddings::create_embedder;
use campusfaq_common::errors::Result;
use campusfaq_common::generation::create_generator;
use campusfaq_common::rerank::create_reranker;
use campusfaq_index::{FullScanRetriever, VectorIndex};
use std::sync::Arc;

/// Wire a full orchestrator from configuration and a loaded index.
///
/// This is the construction entry point for the request-handling shell:
/// every collaborator is built here and injected, with an explicit
/// lifecycle owned by the caller.
pub fn build_orchestrator(
    config: &AppConfig,
    index: Arc<VectorIndex>,
) -> Result<DialogueOrchestrator> {
    let embedder = create_embedder(&config.embedding)?;
    let reranker = create_reranker(&config.reranker)?;
    let generator = create_generator(&config.generation)?;
    let coarse = Arc::new(FullScanRetriever::new(index.clone()));

    let pipeline = RetrievalPipeline::new(
        embedder,
        coarse,
        reranker,
        index,
        config.retrieval.top_k,
        config.reranker.top_n,
    );

    Ok(DialogueOrchestrator::new(pipeline, generator, &config.dialogue))
}
