//! Thread-safe handle around a [`FlatIndex`].
//!
//! The index itself does no locking. `SharedIndex` serializes access with a
//! single reader/writer lock: searches and saves share the read lock, adds and
//! loads take the write lock.

use crate::config::IndexConfig;
use crate::error::Result;
use crate::index::FlatIndex;
use crate::ranker::Neighbor;
use crate::store::VectorId;
use bytes::Bytes;
use parking_lot::{RwLock, RwLockReadGuard};
use std::path::Path;
use std::sync::Arc;

/// Cloneable, `Send + Sync` index handle.
#[derive(Debug, Clone)]
pub struct SharedIndex {
    inner: Arc<RwLock<FlatIndex>>,
}

impl SharedIndex {
    /// See [`FlatIndex::new`].
    pub fn new(dimension: usize) -> Self {
        Self::from_index(FlatIndex::new(dimension))
    }

    pub fn with_config(config: IndexConfig) -> Result<Self> {
        Ok(Self::from_index(FlatIndex::with_config(config)?))
    }

    pub fn from_index(index: FlatIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    pub fn add(&self, vector: &[f32]) -> Result<VectorId> {
        self.inner.write().add(vector)
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.inner.read().search(query, k)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.inner.read().save(path)
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.inner.write().load(path)
    }

    pub fn to_bytes(&self) -> Bytes {
        self.inner.read().to_bytes()
    }

    pub fn load_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.inner.write().load_bytes(bytes)
    }

    pub fn count(&self) -> usize {
        self.inner.read().count()
    }

    pub fn dimension(&self) -> usize {
        self.inner.read().dimension()
    }

    /// Hold the read lock for several operations against one snapshot.
    pub fn read(&self) -> RwLockReadGuard<'_, FlatIndex> {
        self.inner.read()
    }
}
