//! Request and response data transfer objects for the REST API.
//!
//! All types derive `Serialize` and/or `Deserialize` for JSON marshalling via Axum.

use ragindex_core::builder::SkippedFile;
use ragindex_core::{config, ScoredRecord};
use serde::{Deserialize, Serialize};

/// Request body for `POST /search` and `POST /context`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub embedding: Vec<f32>,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    config::DEFAULT_K
}

/// One ranked neighbor.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchHit {
    pub index: usize,
    pub score: f32,
    pub path: String,
    pub caption: String,
    pub labels: Vec<String>,
}

impl From<ScoredRecord<'_>> for SearchHit {
    fn from(hit: ScoredRecord<'_>) -> Self {
        Self {
            index: hit.index,
            score: hit.score,
            path: hit.record.path.clone(),
            caption: hit.record.caption.clone(),
            labels: hit.record.labels.clone(),
        }
    }
}

/// Response body for `POST /search`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub context: String,
}

/// Response body for `POST /context`.
///
/// Retrieval failures never fail the request; they leave `context` empty and
/// set `warning`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContextResponse {
    pub context: String,
    pub neighbors: usize,
    pub warning: Option<String>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub dimension: Option<usize>,
    pub count: usize,
    pub memory_bytes: usize,
    pub uptime_secs: u64,
}

/// Response body for `POST /admin/rebuild`.
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub indexed: usize,
    pub dimension: Option<usize>,
    pub skipped: Vec<SkippedFile>,
    pub elapsed_ms: u128,
}
