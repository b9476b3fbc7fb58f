//! Prometheus metrics for the league server.
//!
//! Counters are always recorded through the `metrics` facade; they are only
//! exported when a scrape endpoint is configured (`METRICS_BIND`).
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and duration
//! - **League Metrics**: Enrollments, partitions, schedules, matches, results
//! - **Error Metrics**: Rejected operations by error kind

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// League Metrics
// ============================================================================

/// Increment enrollments counter (`override` marks out-of-range admissions).
pub fn enrollments_total(by_override: bool) {
    metrics::counter!("league_enrollments_total",
        "override" => by_override.to_string()
    )
    .increment(1);
}

/// Increment withdrawals counter.
pub fn withdrawals_total() {
    metrics::counter!("league_withdrawals_total").increment(1);
}

/// Increment partitions counter and record the number of groups produced.
pub fn partitions_total(groups: usize) {
    metrics::counter!("league_partitions_total").increment(1);
    metrics::histogram!("league_partition_groups").record(groups as f64);
}

/// Increment generated schedules counter.
pub fn schedules_generated_total() {
    metrics::counter!("league_schedules_generated_total").increment(1);
}

/// Add newly materialized matches.
pub fn matches_materialized_total(count: usize) {
    metrics::counter!("league_matches_materialized_total").increment(count as u64);
}

/// Increment recorded results counter.
pub fn results_recorded_total() {
    metrics::counter!("league_results_recorded_total").increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Increment rejected operations counter.
pub fn rejected_operations_total(kind: &'static str) {
    metrics::counter!("league_rejected_operations_total", "kind" => kind).increment(1);
}
