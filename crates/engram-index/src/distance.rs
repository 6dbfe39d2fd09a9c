//! Distance evaluation between stored vectors and queries.
//!
//! The index ranks by full Euclidean distance: the square root of the sum of
//! squared coordinate-wise differences. The squared form is exposed under its
//! own name and is never returned from a search.
//!
//! Accumulation runs strictly left to right in `f32`, so results are
//! reproducible against distances computed from persisted data.

/// Compute Euclidean (L2) distance between two vectors.
///
/// Returns sqrt(sum((a[i] - b[i])^2)). Identical inputs yield exactly `0.0`.
///
/// # Example
///
/// ```
/// use engram_index::euclidean_distance;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0, 6.0];
/// let dist = euclidean_distance(&a, &b);
/// assert!((dist - 5.196).abs() < 0.01); // sqrt(27)
/// ```
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    euclidean_distance_squared(a, b).sqrt()
}

/// Compute squared Euclidean distance (no square root).
///
/// Monotone in [`euclidean_distance`], but not what the index reports.
#[inline]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut sum = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        let d = x - y;
        sum += d * d;
    }
    sum
}
