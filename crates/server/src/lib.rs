//! ragindex-server: CLI and HTTP front end for the ragindex retrieval index.
//!
//! Provides the REST API and the sidecar embedder used by offline rebuilds.
//! Index logic lives in `ragindex-core`.

/// REST API layer: Axum router, HTTP handlers, models, and metrics.
pub mod api;
/// Reads precomputed embeddings stored next to each image.
pub mod embedder;
