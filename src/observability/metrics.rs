//! Metrics collection and exposition.
//!
//! # Metrics
//! - `notes_http_requests_total` (counter): requests by method, route, status
//! - `notes_http_request_duration_seconds` (histogram): handler latency
//! - `notes_summarize_attempts_total` (counter): outbound attempts
//! - `notes_outbound_retries_total` (counter): retries by disposition
//! - `notes_summarize_outcomes_total` (counter): final outcome by kind
//! - `notes_summarize_duration_seconds` (histogram): whole call incl. retries
//! - `notes_store_size` (gauge): notes held by the store
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library code and
//!   tests call these freely

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::Disposition;
use crate::summarizer::SummarizeErrorKind;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "notes_http_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "notes_http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_summarize_attempt() {
    counter!("notes_summarize_attempts_total").increment(1);
}

pub fn record_outbound_retry(disposition: Disposition) {
    let label = match disposition {
        Disposition::RetryWithBackoff => "backoff",
        Disposition::RetryImmediately => "immediate",
        Disposition::Terminal => "terminal",
    };
    counter!("notes_outbound_retries_total", "disposition" => label).increment(1);
}

/// `None` means the call produced a summary.
pub fn record_summarize_outcome(error: Option<SummarizeErrorKind>, start: Instant) {
    let outcome = error.map_or("success", |kind| kind.as_str());
    counter!("notes_summarize_outcomes_total", "outcome" => outcome).increment(1);
    histogram!("notes_summarize_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_store_size(size: usize) {
    gauge!("notes_store_size").set(size as f64);
}
