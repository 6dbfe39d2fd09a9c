//! Exhaustive k-nearest-neighbor ranking.
//!
//! Every stored vector is scored against the query, then the `k` best are
//! selected. Ordering is total and deterministic:
//!
//! 1. ascending distance, compared with [`f32::total_cmp`]
//! 2. NaN after every other distance, whatever its sign bit
//! 3. ascending vector ID among equal distances (all NaNs count as equal)
//!
//! Since the order is total, partial selection followed by sorting the prefix
//! returns exactly what a full sort followed by truncation would.

use crate::distance::euclidean_distance;
use crate::store::{FlatStore, VectorId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of results returned when the caller does not ask for a specific `k`.
pub const DEFAULT_K: usize = 1;

/// A single search result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// The stored vector's ID.
    pub id: VectorId,
    /// Euclidean distance to the query (lower = more similar).
    pub distance: f32,
}

impl Neighbor {
    pub fn new(id: VectorId, distance: f32) -> Self {
        Self { id, distance }
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        // total_cmp alone puts negative NaN (what x86 produces for inf - inf)
        // before -inf.
        let by_distance = match (self.distance.is_nan(), other.distance.is_nan()) {
            (false, false) => self.distance.total_cmp(&other.distance),
            (true, true) => Ordering::Equal,
            (nan, _) => nan.cmp(&!nan),
        };
        by_distance.then_with(|| self.id.cmp(&other.id))
    }
}

impl From<Neighbor> for (VectorId, f32) {
    fn from(n: Neighbor) -> Self {
        (n.id, n.distance)
    }
}

/// Convert a host-supplied signed result count into a usable `k`.
///
/// Zero and negative requests mean "no results".
///
/// ```
/// use engram_index::clamp_k;
///
/// assert_eq!(clamp_k(-3), 0);
/// assert_eq!(clamp_k(0), 0);
/// assert_eq!(clamp_k(5), 5);
/// ```
pub fn clamp_k(k: i64) -> usize {
    if k <= 0 {
        0
    } else {
        usize::try_from(k).unwrap_or(usize::MAX)
    }
}

/// Rank every vector in `store` against `query` and keep the `k` closest.
///
/// The caller validates the query dimension. Returns `min(k, count)` results.
pub fn top_k(store: &FlatStore, query: &[f32], k: usize) -> Vec<Neighbor> {
    let k = k.min(store.count());
    if k == 0 {
        return Vec::new();
    }

    let mut results: Vec<Neighbor> = store
        .iter()
        .enumerate()
        .map(|(id, vector)| Neighbor::new(id, euclidean_distance(vector, query)))
        .collect();

    if k < results.len() {
        results.select_nth_unstable(k - 1);
        results.truncate(k);
    }
    results.sort_unstable();

    results
}
