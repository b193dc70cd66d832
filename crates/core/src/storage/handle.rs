//! Shared, read-mostly handle to the live index.
//!
//! Readers take an `Arc` snapshot and scan it without holding any lock; a
//! rebuild constructs a fresh [`RagIndex`] off to the side and swaps it in under a
//! brief write lock. A snapshot taken before the swap keeps scanning the old
//! index until it is dropped.

use crate::storage::index::RagIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle; all clones observe the same current index.
#[derive(Debug, Clone, Default)]
pub struct IndexHandle {
    current: Arc<RwLock<Arc<RagIndex>>>,
}

impl IndexHandle {
    pub fn new(index: RagIndex) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    /// Returns the index visible right now.
    pub fn snapshot(&self) -> Arc<RagIndex> {
        Arc::clone(&self.current.read())
    }

    /// Atomically replaces the visible index, returning the previous one.
    pub fn replace(&self, index: RagIndex) -> Arc<RagIndex> {
        let next = Arc::new(index);
        let mut guard = self.current.write();
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use std::thread;

    fn single(caption: &str, v: &[f32]) -> RagIndex {
        let mut index = RagIndex::new();
        index.insert(v, Record::new("x.jpg", caption, vec![])).unwrap();
        index
    }

    #[test]
    fn test_default_handle_is_empty() {
        let handle = IndexHandle::default();
        assert!(handle.snapshot().is_empty());
    }

    #[test]
    fn test_replace_does_not_disturb_existing_snapshot() {
        let handle = IndexHandle::new(single("old", &[1.0, 0.0]));
        let before = handle.snapshot();

        let previous = handle.replace(single("new", &[0.0, 1.0, 0.0]));
        assert_eq!(previous.record(0).unwrap().caption, "old");

        // In-flight reader still sees the old rows and dimension.
        assert_eq!(before.dimension(), Some(2));
        assert_eq!(before.search(&[1.0, 0.0], 1).unwrap()[0].caption, "old");

        let after = handle.snapshot();
        assert_eq!(after.dimension(), Some(3));
        assert_eq!(after.record(0).unwrap().caption, "new");
    }

    #[test]
    fn test_concurrent_readers_with_swap() {
        let handle = IndexHandle::new(single("a", &[1.0, 0.0]));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let h = handle.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        let snap = h.snapshot();
                        assert_eq!(snap.len(), 1);
                        assert!(snap.validate().is_ok());
                    }
                })
            })
            .collect();
        for i in 0..50 {
            handle.replace(single(&format!("v{i}"), &[0.0, 1.0]));
        }
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(handle.snapshot().record(0).unwrap().caption, "v49");
    }
}
