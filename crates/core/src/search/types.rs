//! Scored record type for search results.

use crate::record::Record;
use serde::Serialize;

/// A metadata record with the row it came from and its inner-product score.
///
/// Returned by [`crate::storage::RagIndex::search_scored`]; the plain
/// [`search`](crate::storage::RagIndex::search) drops the score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord<'a> {
    /// Row index in insertion order.
    pub index: usize,
    /// Inner product between query and stored vector (higher = more similar).
    pub score: f32,
    /// The matched record.
    pub record: &'a Record,
}
