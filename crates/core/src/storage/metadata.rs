//! Ordered metadata records, parallel to vector rows.

use crate::error::{IndexError, Result};
use crate::record::Record;

/// Records indexed by the same row key space as [`super::VectorStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataStore {
    records: Vec<Record>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn append(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, i: usize) -> Result<&Record> {
        self.records.get(i).ok_or(IndexError::IndexOutOfRange {
            index: i,
            len: self.records.len(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Rough heap footprint of all records.
    pub fn estimate_memory_bytes(&self) -> usize {
        self.records
            .iter()
            .map(|r| {
                r.path.len()
                    + r.caption.len()
                    + r.labels.iter().map(|l| l.len() + 24).sum::<usize>()
                    + std::mem::size_of::<Record>()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_get() {
        let mut meta = MetadataStore::new();
        meta.append(Record::new("a.jpg", "A", vec![]));
        meta.append(Record::new("b.jpg", "B", vec!["dog".into()]));
        assert_eq!(meta.count(), 2);
        assert_eq!(meta.get(1).unwrap().caption, "B");
        assert_eq!(meta.get(1).unwrap().labels, vec!["dog".to_string()]);
    }

    #[test]
    fn test_get_out_of_range() {
        let meta = MetadataStore::new();
        assert!(matches!(
            meta.get(0),
            Err(IndexError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }
}
