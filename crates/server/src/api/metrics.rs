//! Prometheus metrics recording.

use metrics::{counter, gauge, histogram};
use ragindex_core::{BuildReport, RagIndex};
use std::time::Duration;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records a search and how many neighbors it returned.
pub fn record_search(kind: &str, hits: usize, duration: Duration) {
    counter!("ragindex_search_total", "type" => kind.to_string()).increment(1);
    histogram!("ragindex_search_hits", "type" => kind.to_string()).record(hits as f64);
    histogram!("ragindex_search_duration_seconds", "type" => kind.to_string())
        .record(duration.as_secs_f64());
}

/// Records a degraded retrieval (context served without neighbors).
pub fn record_retrieval_fallback() {
    counter!("ragindex_retrieval_fallback_total").increment(1);
}

/// Records the outcome of a rebuild.
pub fn record_rebuild(report: &BuildReport) {
    counter!("ragindex_rebuild_total").increment(1);
    counter!("ragindex_rebuild_skipped_files_total").increment(report.skipped.len() as u64);
    histogram!("ragindex_rebuild_duration_seconds").record(report.elapsed.as_secs_f64());
}

/// Updates index-level gauges.
pub fn update_index_metrics(index: &RagIndex) {
    gauge!("ragindex_rows").set(index.len() as f64);
    gauge!("ragindex_dimension").set(index.dimension().unwrap_or(0) as f64);
    gauge!("ragindex_memory_bytes").set(index.estimate_memory_bytes() as f64);
}
