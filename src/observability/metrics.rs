//! Metrics collection.
//!
//! # Metrics
//! - `rancher_client_requests_total` (counter): completed calls by method, status
//! - `rancher_client_request_duration_seconds` (histogram): call latency by method
//! - `rancher_client_request_errors_total` (counter): failed calls by error kind
//!
//! # Design Decisions
//! - A call that got any response counts as completed, whatever its status
//! - Labels are bounded: methods, status codes and error kinds only

use std::time::Instant;

pub const REQUESTS_TOTAL: &str = "rancher_client_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "rancher_client_request_duration_seconds";
pub const REQUEST_ERRORS_TOTAL: &str = "rancher_client_request_errors_total";

/// Record a completed call.
pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed call.
pub fn record_error(kind: &'static str) {
    ::metrics::counter!(REQUEST_ERRORS_TOTAL, "kind" => kind).increment(1);
}
