//! # ragindex-core
//!
//! Embeddable similarity-search index for retrieval-augmented image captioning.
//! Given an image embedding, it returns the metadata (caption, labels, source
//! path) of the `k` most similar indexed images, ranked by inner product.
//!
//! This is the core library crate with zero async dependencies. The index is
//! an exact flat scan over an in-memory f32 arena, persisted as a checksummed
//! binary vector file plus a JSON metadata document.
//!
//! ```text
//! rebuild(dir, embedder) → RagIndex { VectorStore, MetadataStore } → save → disk
//! disk → load → RagIndex → search(query, k) → ranked records → build_context
//! ```

/// Full index rebuild from an image directory through an external embedder.
pub mod builder;
/// Global configuration constants: limits, defaults, and file-format constants.
pub mod config;
/// Error taxonomy shared by every component.
pub mod error;
/// Dependency-injected embed → search → caption request flow.
pub mod pipeline;
/// Metadata record attached to every vector row.
pub mod record;
/// Search primitives: inner product, exact top-k, scored results, and context formatting.
pub mod search;
/// Storage layer: vector arena, metadata, paired index, shared handle, and disk persistence.
pub mod storage;

pub use builder::{rebuild, BuildReport, Embedder};
pub use error::{CollaboratorError, IndexError, Result};
pub use pipeline::{CaptionOptions, CaptionOutcome, CaptionPipeline, Captioner};
pub use record::Record;
pub use search::{build_context, ScoredRecord};
pub use storage::{load, save, IndexHandle, MetadataStore, RagIndex, VectorStore};
