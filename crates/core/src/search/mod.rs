//! Search primitives: inner-product scoring, exact top-k selection, scored
//! results, and retrieval context formatting.

/// Neighbor-to-text formatting for caption prompts.
pub mod context;
/// Inner-product similarity.
pub mod distance;
/// Brute-force top-k over a vector store.
pub mod flat;
/// Scored result types.
pub mod types;

pub use context::build_context;
pub use flat::top_k;
pub use types::ScoredRecord;
