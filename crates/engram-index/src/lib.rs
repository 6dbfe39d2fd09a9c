//! Brute force vector similarity index.
//!
//! This crate stores fixed-dimension `f32` vectors back-to-back in one buffer,
//! answers k-nearest-neighbor queries by scanning every vector, and persists
//! the whole index to a flat binary file:
//!
//! - **FlatStore**: contiguous vector storage, IDs assigned by insertion order
//! - **Distance**: Euclidean (L2) distance, accumulated left to right
//! - **Ranker**: exact top-k with a deterministic (distance, id) order
//! - **Codec**: `[dimension u64][count u64][f32 payload]`, little-endian
//!
//! # Architecture
//!
//! ```text
//! add ──────▶ FlatStore ◀────── load (replace)
//!                │   │
//!     search ◀── Ranker ── Distance
//!                    │
//!                 Codec ──────▶ save
//! ```
//!
//! # Example
//!
//! ```
//! use engram_index::FlatIndex;
//!
//! let mut index = FlatIndex::new(3);
//!
//! assert_eq!(index.add(&[1.0, 0.0, 0.0]).unwrap(), 0);
//! assert_eq!(index.add(&[0.0, 1.0, 0.0]).unwrap(), 1);
//!
//! let results = index.search(&[0.9, 0.1, 0.0], 1).unwrap();
//! assert_eq!(results[0].id, 0);
//! assert!((results[0].distance - 0.1414).abs() < 1e-4);
//! ```

mod codec;
mod config;
mod distance;
mod error;
mod index;
mod ranker;
mod shared;
mod store;

pub use codec::{IndexHeader, HEADER_SIZE, SCALAR_SIZE};
pub use config::{IndexConfig, DEFAULT_INITIAL_CAPACITY};
pub use distance::{euclidean_distance, euclidean_distance_squared};
pub use error::{IndexError, Result};
pub use index::FlatIndex;
pub use ranker::{clamp_k, Neighbor, DEFAULT_K};
pub use shared::SharedIndex;
pub use store::{FlatStore, VectorId};
