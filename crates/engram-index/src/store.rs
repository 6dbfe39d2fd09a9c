//! Flat vector storage.
//!
//! All vectors live back-to-back in a single `Vec<f32>`:
//!
//! ```text
//! [v0_d0, v0_d1, ..., v0_dN, v1_d0, v1_d1, ..., v1_dN, ...]
//! ```
//!
//! Vector `id` occupies `data[id * dimension..(id + 1) * dimension]`. The
//! length of `data` is always `count * dimension`.

use crate::error::{IndexError, Result};

/// Zero-based insertion-order identifier of a stored vector.
pub type VectorId = usize;

/// Contiguous storage for fixed-dimension vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatStore {
    data: Vec<f32>,
    dimension: usize,
    count: usize,
}

impl FlatStore {
    /// Create an empty store, reserving room for `capacity` vectors.
    pub fn with_capacity(dimension: usize, capacity: usize) -> Self {
        Self {
            data: reserve_hint(dimension.saturating_mul(capacity)),
            dimension,
            count: 0,
        }
    }

    /// Build a store from an already-decoded buffer.
    ///
    /// `data.len()` must equal `count * dimension`.
    pub(crate) fn from_raw(dimension: usize, count: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), count * dimension);
        Self {
            data,
            dimension,
            count,
        }
    }

    /// Append a vector, returning its ID.
    ///
    /// Fails with [`IndexError::DimensionMismatch`] without touching the store
    /// if `vector.len() != dimension`.
    pub fn append(&mut self, vector: &[f32]) -> Result<VectorId> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let id = self.count;
        self.data.extend_from_slice(vector);
        self.count += 1;
        Ok(id)
    }

    /// Read-only view of vector `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= count`. Use [`FlatStore::get`] for untrusted IDs.
    #[inline]
    pub fn vector_at(&self, id: VectorId) -> &[f32] {
        let start = id * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Bounds-checked variant of [`FlatStore::vector_at`].
    pub fn get(&self, id: VectorId) -> Option<&[f32]> {
        (id < self.count).then(|| self.vector_at(id))
    }

    /// Iterate over stored vectors in ID order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        // chunks_exact(0) panics
        self.data
            .chunks_exact(self.dimension.max(1))
            .take(self.count)
    }

    /// The whole buffer, in store order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Best-effort reservation. Growth on `append` handles a hint the
/// allocator refuses.
fn reserve_hint(scalars: usize) -> Vec<f32> {
    let mut data = Vec::new();
    if data.try_reserve_exact(scalars).is_err() {
        tracing::debug!(scalars, "capacity hint not reserved");
    }
    data
}
