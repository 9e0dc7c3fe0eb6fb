//! Gateway metrics collection.
//!
//! Provides standardized metrics for monitoring backend calls:
//! - Request counters by operation and status
//! - Latency histograms
//! - Not-ready responses seen while analysis is running

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total backend requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "gateway_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "gateway_latency_seconds";

    /// Suggestion fetches answered with PLACEMENT_NOT_FOUND.
    pub const NOT_READY_TOTAL: &str = "gateway_not_ready_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record metrics for a completed backend request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    let status_str = status.to_string();

    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status_str
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a not-ready answer from the suggestion endpoint.
pub fn record_not_ready() {
    counter!(names::NOT_READY_TOTAL).increment(1);
}

// =============================================================================
// Tests
// =============================================================================
