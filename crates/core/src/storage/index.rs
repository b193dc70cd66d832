//! The retrieval index: vector rows paired with metadata records.
//!
//! A [`RagIndex`] owns one [`VectorStore`] and one [`MetadataStore`] and only
//! exposes paired mutation, so row `i` of the vectors always describes record
//! `i` of the metadata. Searches are exact brute-force scans.

use crate::error::{IndexError, Result};
use crate::record::Record;
use crate::search::{top_k, ScoredRecord};
use crate::storage::metadata::MetadataStore;
use crate::storage::vectors::VectorStore;

/// Ordered collection of `(vector, record)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RagIndex {
    vectors: VectorStore,
    metadata: MetadataStore,
}

impl RagIndex {
    /// Creates an empty index (no dimension, no rows).
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins separately loaded stores, rejecting a pair whose row counts disagree.
    pub fn from_parts(vectors: VectorStore, metadata: MetadataStore) -> Result<Self> {
        let index = Self { vectors, metadata };
        index.validate()?;
        Ok(index)
    }

    /// Checks the row-count invariant between the two stores.
    pub fn validate(&self) -> Result<()> {
        let rows = self.vectors.row_count();
        let records = self.metadata.count();
        if rows != records {
            return Err(IndexError::corrupt(format!(
                "vector rows ({rows}) != metadata records ({records})"
            )));
        }
        Ok(())
    }

    /// Appends a vector and its record as one row.
    ///
    /// The vector is validated first; on failure neither store changes.
    /// Returns the new row index.
    pub fn insert(&mut self, vector: &[f32], record: Record) -> Result<usize> {
        self.vectors.check(vector)?;
        let row = self.vectors.row_count();
        self.vectors.add(vector)?;
        self.metadata.append(record);
        Ok(row)
    }

    pub fn len(&self) -> usize {
        self.vectors.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed dimension, or `None` while the index is empty.
    pub fn dimension(&self) -> Option<usize> {
        self.vectors.dimension()
    }

    pub fn vector(&self, i: usize) -> Result<&[f32]> {
        self.vectors.row(i)
    }

    pub fn record(&self, i: usize) -> Result<&Record> {
        self.metadata.get(i)
    }

    pub fn vectors(&self) -> &VectorStore {
        &self.vectors
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Top-`k` records by descending inner product with `query`.
    ///
    /// Empty index or `k == 0` returns an empty list; `k` larger than the row
    /// count is clamped. Ties resolve to the earlier-inserted row.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<&Record>> {
        Ok(self
            .search_scored(query, k)?
            .into_iter()
            .map(|hit| hit.record)
            .collect())
    }

    /// Like [`search`](Self::search), but keeps row indices and scores.
    pub fn search_scored(&self, query: &[f32], k: usize) -> Result<Vec<ScoredRecord<'_>>> {
        top_k(&self.vectors, query, k)?
            .into_iter()
            .map(|(index, score)| {
                Ok(ScoredRecord {
                    index,
                    score,
                    record: self.metadata.get(index)?,
                })
            })
            .collect()
    }

    /// Estimates the in-memory footprint of vectors and records in bytes.
    pub fn estimate_memory_bytes(&self) -> usize {
        self.vectors.estimate_memory_bytes() + self.metadata.estimate_memory_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(caption: &str) -> Record {
        Record::new(format!("{caption}.jpg"), caption, vec![])
    }

    fn abc_index() -> RagIndex {
        let mut index = RagIndex::new();
        index.insert(&[1.0, 0.0], rec("A")).unwrap();
        index.insert(&[0.0, 1.0], rec("B")).unwrap();
        index.insert(&[0.7071, 0.7071], rec("C")).unwrap();
        index
    }

    fn captions(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.caption.clone()).collect()
    }

    #[test]
    fn test_insert_keeps_stores_aligned() {
        let index = abc_index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimension(), Some(2));
        assert_eq!(index.vectors().row_count(), index.metadata().count());
        assert_eq!(index.record(2).unwrap().caption, "C");
        assert_eq!(index.vector(1).unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn test_failed_insert_adds_nothing() {
        let mut index = abc_index();
        assert!(matches!(
            index.insert(&[1.0, 0.0, 0.0], rec("D")),
            Err(IndexError::DimensionMismatch { .. })
        ));
        assert_eq!(index.len(), 3);
        assert_eq!(index.metadata().count(), 3);
        assert!(index.validate().is_ok());
    }

    #[test]
    fn test_search_end_to_end() {
        let index = abc_index();
        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(captions(&hits), vec!["A", "C"]);

        let scored = index.search_scored(&[1.0, 0.0], 2).unwrap();
        assert!((scored[0].score - 1.0).abs() < 1e-6);
        assert!((scored[1].score - 0.7071).abs() < 1e-4);
        assert_eq!(scored[1].index, 2);
    }

    #[test]
    fn test_search_empty_index() {
        let index = RagIndex::new();
        assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
        assert!(index.search(&[1.0, 0.0, 3.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_zero_k() {
        let index = abc_index();
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_k_larger_than_rows() {
        let index = abc_index();
        let hits = index.search(&[0.0, 1.0], 10).unwrap();
        assert_eq!(captions(&hits), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let index = abc_index();
        assert!(matches!(
            index.search(&[1.0], 1),
            Err(IndexError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_from_parts_rejects_misaligned_stores() {
        let mut vectors = VectorStore::new();
        vectors.add(&[1.0, 0.0]).unwrap();
        let metadata = MetadataStore::from_records(vec![rec("A"), rec("B")]);
        assert!(matches!(
            RagIndex::from_parts(vectors, metadata),
            Err(IndexError::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_estimate_memory_bytes_grows() {
        let mut index = RagIndex::new();
        let before = index.estimate_memory_bytes();
        index.insert(&[1.0, 0.0], rec("A")).unwrap();
        assert!(index.estimate_memory_bytes() > before);
    }
}
