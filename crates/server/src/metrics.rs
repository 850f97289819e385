//! Prometheus metrics for the HTTP host.
//!
//! HTTP request metrics and project counters live here; the core
//! generation metrics are registered into the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;

use contentforge_core::ProjectFilter;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "contentforge_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("contentforge_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "contentforge_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Project Metrics
// =============================================================================

/// Projects created.
pub static PROJECTS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "contentforge_projects_created_total",
        "Total projects created",
    )
    .unwrap()
});

/// Projects whose background generation failed.
pub static PROJECTS_FAILED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "contentforge_projects_failed_total",
        "Total projects that ended in the failed state",
    )
    .unwrap()
});

/// Current number of projects by state.
pub static PROJECTS_BY_STATE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("contentforge_projects_by_state", "Number of projects by state"),
        &["state"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Projects
    registry
        .register(Box::new(PROJECTS_CREATED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(PROJECTS_FAILED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(PROJECTS_BY_STATE.clone()))
        .unwrap();

    // Core metrics (generation, model calls, quantity contract)
    for metric in contentforge_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Refresh gauges that mirror stored state.
///
/// Called right before encoding so a scrape sees current project counts.
pub fn collect_dynamic_metrics(state: &AppState) {
    for state_type in ["pending", "generating", "completed", "failed"] {
        let filter = ProjectFilter::new().with_state(state_type);
        if let Ok(count) = state.projects().count(&filter) {
            PROJECTS_BY_STATE.with_label_values(&[state_type]).set(count);
        }
    }
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_SEGMENT.replace_all(path, "{id}");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}
