//! Dense row-major f32 matrix holding every indexed embedding.
//!
//! All rows live contiguously in a single arena (`data[i * dim..(i + 1) * dim]`),
//! so a brute-force scan walks memory linearly. The dimension is unset until the
//! first vector is added and never changes afterwards.

use crate::config;
use crate::error::{IndexError, Result};

/// Append-only, fixed-dimension vector storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorStore {
    dimension: Option<usize>,
    data: Vec<f32>,
}

impl VectorStore {
    /// Creates an empty store with no dimension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a raw row-major buffer.
    ///
    /// A zero dimension with no data yields an empty store.
    pub fn from_raw(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            if !data.is_empty() {
                return Err(IndexError::corrupt(format!(
                    "{} floats stored with dimension 0",
                    data.len()
                )));
            }
            return Ok(Self::new());
        }
        if data.len() % dimension != 0 {
            return Err(IndexError::corrupt(format!(
                "{} floats is not a multiple of dimension {}",
                data.len(),
                dimension
            )));
        }
        if data.is_empty() {
            return Ok(Self::new());
        }
        Ok(Self {
            dimension: Some(dimension),
            data,
        })
    }

    /// Appends a vector as a new row. The first row fixes the dimension.
    pub fn add(&mut self, vector: &[f32]) -> Result<()> {
        self.check(vector)?;
        if self.dimension.is_none() {
            self.dimension = Some(vector.len());
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    /// Validates `vector` against the store without mutating it.
    pub fn check(&self, vector: &[f32]) -> Result<()> {
        if let Some(dim) = self.dimension {
            if vector.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
        }
        validate_vector(vector)
    }

    /// Number of stored rows (0 while empty).
    pub fn row_count(&self) -> usize {
        match self.dimension {
            Some(dim) => self.data.len() / dim,
            None => 0,
        }
    }

    /// Fixed dimension, or `None` before the first row.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only view of row `i`.
    pub fn row(&self, i: usize) -> Result<&[f32]> {
        let len = self.row_count();
        match self.dimension {
            Some(dim) if i < len => Ok(&self.data[i * dim..(i + 1) * dim]),
            _ => Err(IndexError::IndexOutOfRange { index: i, len }),
        }
    }

    /// Lazy iterator over all rows in insertion order. Clone it to restart.
    pub fn all_rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + Clone + '_ {
        self.data.chunks_exact(self.dimension.unwrap_or(1))
    }

    /// The whole row-major arena.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn estimate_memory_bytes(&self) -> usize {
        self.data.capacity() * std::mem::size_of::<f32>()
    }
}

/// Rejects vectors no index should hold: empty, wider than
/// [`config::MAX_DIMENSION`], or carrying NaN/Inf components.
pub fn validate_vector(vector: &[f32]) -> Result<()> {
    if vector.is_empty() {
        return Err(IndexError::InvalidVector("vector is empty".into()));
    }
    if vector.len() > config::MAX_DIMENSION {
        return Err(IndexError::InvalidVector(format!(
            "dimension {} exceeds maximum {}",
            vector.len(),
            config::MAX_DIMENSION
        )));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(IndexError::InvalidVector("vector contains NaN or Inf".into()));
    }
    Ok(())
}
