//! Structured logging configuration.
//!
//! The engine logs through the `log` facade; `tracing-subscriber` picks those
//! records up alongside the server's own `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var (default `info`).
///
/// # Example
///
/// ```no_run
/// use cl_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log API request/response
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `path` - Request path
/// * `status_code` - Response status code
/// * `duration_ms` - Request duration in milliseconds
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    if status_code >= 500 {
        tracing::error!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request failed"
        );
    } else {
        tracing::info!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}

/// Log a league operation refused by the engine
///
/// # Arguments
///
/// * `kind` - Stable error tag (e.g. `capacity_exceeded`)
/// * `message` - Full error text, including details hidden from clients
pub fn log_rejected_operation(kind: &str, message: &str) {
    tracing::warn!(error_kind = kind, "Operation rejected: {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_api_request() {
        log_api_request("GET", "/api/v1/groups/1/standings", 200, 3);
        log_api_request("POST", "/api/v1/join", 500, 12);
    }

    #[test]
    fn test_log_rejected_operation() {
        log_rejected_operation("capacity_exceeded", "Rating tier 4 is full (capacity 8)");
    }
}
