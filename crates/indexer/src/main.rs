//! CampusFAQ Indexer
//!
//! Offline binary that builds the persisted index artifact:
//! - reads the FAQ corpus (JSON array of records)
//! - resumes from an existing artifact when one is present
//! - embeds every record through the configured embedding service
//! - atomically writes the validated artifact
//!
//! The build is I/O-bound against a rate-limited service, so interruptions
//! are expected; re-running picks up where the last run stopped.

use campusfaq_common::config::AppConfig;
use campusfaq_common::embeddings::create_embedder;
use campusfaq_common::records::FaqRecord;
use campusfaq_common::VERSION;
use campusfaq_index::{IndexArtifact, IndexBuilder};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.observability.log_level)
            }),
        )
        .with_target(true);
    if config.observability.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    campusfaq_common::metrics::register_metrics();

    info!("Starting CampusFAQ Indexer v{}", VERSION);

    // Load the corpus
    let corpus_path = &config.index.corpus_path;
    let corpus_bytes = std::fs::read(corpus_path)
        .map_err(|e| anyhow::anyhow!("Failed to read corpus {}: {}", corpus_path, e))?;
    let records: Vec<FaqRecord> = serde_json::from_slice(&corpus_bytes)?;
    info!(path = %corpus_path, records = records.len(), "Corpus loaded");

    // Resume from an existing artifact when present
    let artifact_path = &config.index.artifact_path;
    let existing = match IndexArtifact::load(artifact_path) {
        Ok(artifact) => {
            info!(
                entries = artifact.len(),
                "Existing artifact found, resuming build"
            );
            artifact
        }
        Err(e) if e.is_fatal_corpus_error() => {
            warn!(error = %e, "Existing artifact unusable, rebuilding from scratch");
            IndexArtifact::default()
        }
        Err(_) => IndexArtifact::default(),
    };

    let embedder = create_embedder(&config.embedding)?;
    info!(
        model = embedder.model_name(),
        dimension = embedder.dimension(),
        "Embedder ready"
    );

    let builder = IndexBuilder::new().with_pause(config.build_pause());
    let artifact = builder.resume(existing, &records, embedder.as_ref()).await?;

    if artifact.is_empty() {
        anyhow::bail!("No records could be embedded; artifact not written");
    }

    artifact.save(artifact_path)?;
    info!(
        path = %artifact_path,
        entries = artifact.len(),
        "Indexer finished"
    );

    Ok(())
}
