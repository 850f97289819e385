//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Generation requests (results, duration)
//! - Model calls (per task label, tokens)
//! - Script quantity contract (retries, violations)
//! - Auxiliary parse fallbacks

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Generation Requests
// =============================================================================

/// Generation requests total by result.
pub static GENERATION_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "contentforge_generation_requests_total",
            "Total content generation requests",
        ),
        &["result"], // "success", "invalid_request", "model_invocation", "quantity_contract_violation"
    )
    .unwrap()
});

/// Generation duration in seconds.
pub static GENERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "contentforge_generation_duration_seconds",
            "Duration of complete generation requests",
        )
        .buckets(vec![1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Model Calls
// =============================================================================

/// Model calls by task label and outcome.
pub static MODEL_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("contentforge_model_calls_total", "Total model calls"),
        &["task", "result"], // result: "ok", "parse_error", "error", "timeout"
    )
    .unwrap()
});

/// Model call duration in seconds.
pub static MODEL_CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "contentforge_model_call_duration_seconds",
            "Duration of individual model calls",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 90.0]),
        &["task"],
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("contentforge_llm_tokens_total", "Total LLM tokens used"),
        &["direction"], // "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Script Quantity Contract
// =============================================================================

/// Script retries triggered by an item count mismatch.
pub static SCRIPT_RETRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "contentforge_script_retries_total",
        "Total script retries after an item count mismatch",
    )
    .unwrap()
});

/// Scripts rejected after the retry still had the wrong item count.
pub static QUANTITY_VIOLATIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "contentforge_quantity_violations_total",
        "Total scripts rejected for violating the requested item count",
    )
    .unwrap()
});

// =============================================================================
// Auxiliary Assets
// =============================================================================

/// Auxiliary assets that fell back to their empty value.
pub static PARSE_FALLBACKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "contentforge_parse_fallbacks_total",
            "Total auxiliary assets replaced by empty defaults after unparseable output",
        ),
        &["asset"],
    )
    .unwrap()
});

/// All core metrics, for registration by the host.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(GENERATION_REQUESTS.clone()),
        Box::new(GENERATION_DURATION.clone()),
        Box::new(MODEL_CALLS.clone()),
        Box::new(MODEL_CALL_DURATION.clone()),
        Box::new(LLM_TOKENS.clone()),
        Box::new(SCRIPT_RETRIES.clone()),
        Box::new(QUANTITY_VIOLATIONS.clone()),
        Box::new(PARSE_FALLBACKS.clone()),
    ]
}
