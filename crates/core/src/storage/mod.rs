//! Storage layer: vector rows, metadata records, the paired index, the shared
//! handle, and disk persistence.
//!
//! Data lives in memory in a [`RagIndex`] (vectors + records, always the same
//! length). Durability is an explicit [`save`] to two companion files; [`load`]
//! cross-checks them before handing back an index.

/// Paired vector/record index and its search entry points.
pub mod index;
/// Shared handle with atomic index swap.
pub mod handle;
/// Ordered metadata records.
pub mod metadata;
/// Two-file disk persistence with CRC32 integrity.
pub mod persistence;
/// Fixed-dimension vector arena.
pub mod vectors;

pub use handle::IndexHandle;
pub use index::RagIndex;
pub use metadata::MetadataStore;
pub use persistence::{load, save};
pub use vectors::VectorStore;
