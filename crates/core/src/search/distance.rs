//! Inner-product similarity used by the flat scan.
//!
//! Vectors are expected to be L2-normalized by the embedding producer, so the
//! dot product doubles as cosine similarity. The loop is split into fixed-width
//! chunks with independent accumulators so the compiler can auto-vectorize it;
//! the summation order depends only on the length, keeping scores reproducible.

const CHUNK_F32: usize = 8;

/// Dot product of two equal-length f32 slices.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let len = a.len().min(b.len());
    let mut acc = [0.0f32; CHUNK_F32];

    let full_chunks = len / CHUNK_F32;
    for c in 0..full_chunks {
        let base = c * CHUNK_F32;
        for j in 0..CHUNK_F32 {
            acc[j] += a[base + j] * b[base + j];
        }
    }

    let mut sum: f32 = acc.iter().sum();
    for i in (full_chunks * CHUNK_F32)..len {
        sum += a[i] * b[i];
    }
    sum
}
