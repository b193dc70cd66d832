//! Exact brute-force top-k search over a [`VectorStore`].
//!
//! Every row is scored by inner product against the query (O(n·dim)) and the
//! best `k` are kept in a bounded min-heap (O(n log k)). Ranking is by
//! descending score; equal scores rank the earlier-inserted row first.
//!
//! Finite inputs can still overflow the inner product to ±inf or NaN. Such
//! scores are saturated to the finite `f32` range, with NaN ranked last.

use crate::error::{IndexError, Result};
use crate::search::distance::dot_product;
use crate::storage::vectors::{validate_vector, VectorStore};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Heap key: larger is better. A lower row index beats a higher one on equal score.
type RankKey = (OrderedFloat<f32>, Reverse<usize>);

/// Maps a raw inner product to a finite ranking score.
fn rank_score(raw: f32) -> f32 {
    if raw.is_nan() {
        f32::MIN
    } else {
        raw.clamp(f32::MIN, f32::MAX)
    }
}

/// Returns up to `k` `(row, score)` pairs ranked by descending score.
///
/// An empty store or `k == 0` yields an empty result. Fails with
/// `DimensionMismatch` when the query length differs from the store dimension.
pub fn top_k(store: &VectorStore, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
    let dim = match store.dimension() {
        Some(dim) if k > 0 => dim,
        _ => return Ok(Vec::new()),
    };
    if query.len() != dim {
        return Err(IndexError::DimensionMismatch {
            expected: dim,
            actual: query.len(),
        });
    }
    validate_vector(query)?;

    let k = k.min(store.row_count());
    let mut heap: BinaryHeap<Reverse<RankKey>> = BinaryHeap::with_capacity(k + 1);
    for (row, vector) in store.all_rows().enumerate() {
        let score = rank_score(dot_product(query, vector));
        let key = (OrderedFloat(score), Reverse(row));
        if heap.len() < k {
            heap.push(Reverse(key));
        } else if let Some(Reverse(worst)) = heap.peek() {
            if key > *worst {
                heap.pop();
                heap.push(Reverse(key));
            }
        }
    }

    let mut ranked: Vec<RankKey> = heap.into_iter().map(|Reverse(key)| key).collect();
    ranked.sort_unstable_by(|a, b| b.cmp(a));
    Ok(ranked
        .into_iter()
        .map(|(score, Reverse(row))| (row, score.0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(rows: &[&[f32]]) -> VectorStore {
        let mut store = VectorStore::new();
        for row in rows {
            store.add(row).unwrap();
        }
        store
    }

    #[test]
    fn test_top_k_empty_store() {
        let store = VectorStore::new();
        assert!(top_k(&store, &[1.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_top_k_zero_k() {
        let store = store_of(&[&[1.0, 0.0]]);
        assert!(top_k(&store, &[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_top_k_ranking() {
        let store = store_of(&[&[1.0, 0.0], &[0.0, 1.0], &[0.7071, 0.7071]]);
        let results = top_k(&store, &[1.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, 0);
        assert!((results[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(results[1].0, 2);
        assert!((results[1].1 - 0.7071).abs() < 1e-4);
    }

    #[test]
    fn test_top_k_clamps_large_k() {
        let store = store_of(&[&[1.0, 0.0], &[0.0, 1.0], &[-1.0, 0.0]]);
        let results = top_k(&store, &[1.0, 0.0], 50).unwrap();
        let rows: Vec<usize> = results.iter().map(|&(row, _)| row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_top_k_ties_prefer_lower_index() {
        let store = store_of(&[
            &[0.0, 1.0],
            &[1.0, 0.0],
            &[1.0, 0.0],
            &[0.0, 1.0],
            &[1.0, 0.0],
        ]);
        let results = top_k(&store, &[1.0, 0.0], 2).unwrap();
        let rows: Vec<usize> = results.iter().map(|&(row, _)| row).collect();
        assert_eq!(rows, vec![1, 2]);

        let all = top_k(&store, &[1.0, 0.0], 5).unwrap();
        let rows: Vec<usize> = all.iter().map(|&(row, _)| row).collect();
        assert_eq!(rows, vec![1, 2, 4, 0, 3]);
    }

    #[test]
    fn test_top_k_deterministic() {
        let rows: Vec<Vec<f32>> = (0..64)
            .map(|i| vec![((i * 7) % 5) as f32, ((i * 3) % 4) as f32, 1.0])
            .collect();
        let mut store = VectorStore::new();
        for row in &rows {
            store.add(row).unwrap();
        }
        let first = top_k(&store, &[0.3, 0.2, 0.1], 10).unwrap();
        for _ in 0..5 {
            assert_eq!(top_k(&store, &[0.3, 0.2, 0.1], 10).unwrap(), first);
        }
    }

    #[test]
    fn test_top_k_dimension_mismatch() {
        let store = store_of(&[&[1.0, 0.0]]);
        assert!(matches!(
            top_k(&store, &[1.0, 0.0, 0.0], 1),
            Err(IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_overflowing_scores_rank_last_and_stay_finite() {
        // 1e38 * 3e38 overflows to +inf and -inf, summing to NaN.
        let store = store_of(&[&[1.0, 0.0], &[3e38, 3e38]]);
        let results = top_k(&store, &[1e38, -1e38], 2).unwrap();
        assert_eq!(results[0], (0, 1e38));
        assert_eq!(results[1], (1, f32::MIN));
        assert!(results.iter().all(|(_, score)| score.is_finite()));
    }

    #[test]
    fn test_rank_score_saturates_infinities() {
        assert_eq!(rank_score(f32::INFINITY), f32::MAX);
        assert_eq!(rank_score(f32::NEG_INFINITY), f32::MIN);
        assert_eq!(rank_score(f32::NAN), f32::MIN);
        assert_eq!(rank_score(0.25), 0.25);
    }

    #[test]
    fn test_top_k_rejects_nan_query() {
        let store = store_of(&[&[1.0, 0.0]]);
        assert!(matches!(
            top_k(&store, &[f32::NAN, 0.0], 1),
            Err(IndexError::InvalidVector(_))
        ));
    }
}
