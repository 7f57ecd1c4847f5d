//! Metrics and observability utilities
//!
//! Provides metric descriptions with standardized naming conventions.
//! Recording happens at the call sites (clients, orchestrator); this module
//! only registers the descriptions once at startup.

use ::metrics::{describe_counter, describe_histogram, Unit};

/// Metrics prefix for all CampusFAQ metrics
pub const METRICS_PREFIX: &str = "campusfaq";

/// Register all metric descriptions
pub fn register_metrics() {
    // Dialogue metrics
    describe_counter!(
        format!("{}_turns_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of dialogue turns processed"
    );

    describe_counter!(
        format!("{}_plan_grounded_total", METRICS_PREFIX),
        Unit::Count,
        "Turns answered with grounded generation (Plan A)"
    );

    describe_counter!(
        format!("{}_plan_fallback_total", METRICS_PREFIX),
        Unit::Count,
        "Turns answered with ungrounded fallback generation (Plan B)"
    );

    describe_counter!(
        format!("{}_plan_clarification_total", METRICS_PREFIX),
        Unit::Count,
        "Turns answered with a clarification prompt (Plan C)"
    );

    describe_histogram!(
        format!("{}_turn_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end dialogue turn latency in seconds"
    );

    // Retrieval metrics
    describe_counter!(
        format!("{}_retrieval_empty_total", METRICS_PREFIX),
        Unit::Count,
        "Turns where retrieval produced no grounding"
    );

    describe_counter!(
        format!("{}_retrieval_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Retrieval-service failures degraded to empty results"
    );

    // Embedding metrics
    describe_counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding API requests"
    );

    describe_counter!(
        format!("{}_embedding_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding API errors"
    );

    // Rerank metrics
    describe_counter!(
        format!("{}_rerank_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total reranker API requests"
    );

    describe_counter!(
        format!("{}_rerank_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total reranker API errors"
    );

    // Generation metrics
    describe_counter!(
        format!("{}_generation_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total LLM generation requests"
    );

    describe_counter!(
        format!("{}_generation_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total LLM generation errors"
    );

    // Index build metrics
    describe_counter!(
        format!("{}_index_entries_built_total", METRICS_PREFIX),
        Unit::Count,
        "Index entries successfully embedded during build"
    );

    describe_counter!(
        format!("{}_index_entries_skipped_total", METRICS_PREFIX),
        Unit::Count,
        "Index entries skipped because embedding failed"
    );
}
