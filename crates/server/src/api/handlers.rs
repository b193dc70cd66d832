//! HTTP request handlers and application state.

use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use ragindex_core::builder::Embedder;
use ragindex_core::{build_context, config, rebuild, save, IndexHandle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state passed to every handler via Axum's `State` extractor.
///
/// Constructed once in `main` (or a test) and cloned per request; the index is
/// read through `index.snapshot()` and replaced wholesale by a rebuild.
#[derive(Clone)]
pub struct AppState {
    pub index: IndexHandle,
    pub index_path: PathBuf,
    pub meta_path: PathBuf,
    pub sample_dir: PathBuf,
    pub embedder: Arc<dyn Embedder + Send + Sync>,
    pub prometheus_handle: PrometheusHandle,
    /// Held for the duration of a rebuild; a second concurrent rebuild gets 409.
    pub rebuild_lock: Arc<tokio::sync::Mutex<()>>,
    pub start_time: Instant,
}

fn validate_k(k: usize) -> Result<(), ApiError> {
    if k > config::MAX_K {
        return Err(ApiError::BadRequest(format!(
            "k must be 0-{}",
            config::MAX_K
        )));
    }
    Ok(())
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let index = state.index.snapshot();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            dimension: index.dimension(),
            count: index.len(),
            memory_bytes: index.estimate_memory_bytes(),
            uptime_secs: state.start_time.elapsed().as_secs(),
        }),
    )
}

/// `POST /search`: ranked neighbors with scores plus their context string.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    validate_k(req.k)?;
    let start = Instant::now();
    let index = state.index.snapshot();
    let hits = index.search_scored(&req.embedding, req.k)?;
    let context = build_context(hits.iter().map(|h| h.record));
    metrics::record_search("search", hits.len(), start.elapsed());

    Ok(Json(SearchResponse {
        results: hits.into_iter().map(SearchHit::from).collect(),
        context,
    }))
}

/// `POST /context`: the caption-augmentation view of a search.
///
/// Retrieval is optional for captioning, so index errors degrade to an empty
/// context with a warning instead of failing the request.
pub async fn context(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<ContextResponse>, ApiError> {
    validate_k(req.k)?;
    let start = Instant::now();
    let index = state.index.snapshot();
    let response = match index.search(&req.embedding, req.k) {
        Ok(records) => ContextResponse {
            context: build_context(records.iter().copied()),
            neighbors: records.len(),
            warning: None,
        },
        Err(e) => {
            tracing::warn!("Retrieval unavailable, serving empty context: {}", e);
            metrics::record_retrieval_fallback();
            ContextResponse {
                context: String::new(),
                neighbors: 0,
                warning: Some(e.to_string()),
            }
        }
    };
    metrics::record_search("context", response.neighbors, start.elapsed());
    Ok(Json(response))
}

/// `POST /admin/rebuild`: rebuild from the sample directory, save, then swap.
///
/// The running index keeps serving until the new one is saved; a failed
/// rebuild or save leaves it untouched.
pub async fn rebuild_index(
    State(state): State<AppState>,
) -> Result<Json<RebuildResponse>, ApiError> {
    let _guard = state
        .rebuild_lock
        .try_lock()
        .map_err(|_| ApiError::Conflict("A rebuild is already in progress".into()))?;

    let embedder = Arc::clone(&state.embedder);
    let sample_dir = state.sample_dir.clone();
    let index_path = state.index_path.clone();
    let meta_path = state.meta_path.clone();

    let (index, report) = tokio::task::spawn_blocking(move || {
        let (index, report) = rebuild(&sample_dir, &*embedder)?;
        save(&index, &index_path, &meta_path)?;
        Ok::<_, ragindex_core::IndexError>((index, report))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Rebuild task failed: {e}")))??;

    metrics::record_rebuild(&report);
    metrics::update_index_metrics(&index);
    let dimension = index.dimension();
    state.index.replace(index);

    Ok(Json(RebuildResponse {
        indexed: report.indexed,
        dimension,
        skipped: report.skipped,
        elapsed_ms: report.elapsed.as_millis(),
    }))
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}
