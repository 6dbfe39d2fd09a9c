//! Flat vector index.
//!
//! Exhaustive search over a contiguous store - O(n * d) per query, exact
//! results, no approximate structure.

use crate::codec::{self, IndexHeader};
use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::ranker::{self, Neighbor, DEFAULT_K};
use crate::store::{FlatStore, VectorId};
use bytes::Bytes;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Brute force vector index with flat binary persistence.
///
/// Vectors are identified by insertion order. There is no update or delete;
/// the only way to shrink an index is [`FlatIndex::load`], which replaces the
/// whole store.
///
/// # Performance
///
/// - Add: O(d) amortized
/// - Search: O(n * d) distance computation + O(n + k log k) selection
///
/// # Thread Safety
///
/// Mutating operations take `&mut self`. Wrap the index in
/// [`SharedIndex`](crate::SharedIndex) to share it across threads.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    store: FlatStore,
}

impl FlatIndex {
    /// Create an empty index for `dimension`-component vectors.
    ///
    /// # Panics
    ///
    /// Panics if `dimension` is zero. Use [`FlatIndex::with_config`] to get an
    /// error instead.
    ///
    /// # Example
    ///
    /// ```
    /// use engram_index::FlatIndex;
    ///
    /// let index = FlatIndex::new(128);
    /// assert_eq!(index.dimension(), 128);
    /// assert_eq!(index.count(), 0);
    /// ```
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "index dimension must be positive");
        Self::from_valid_config(&IndexConfig::new(dimension))
    }

    /// Create an empty index from a validated configuration.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(&config))
    }

    fn from_valid_config(config: &IndexConfig) -> Self {
        Self {
            store: FlatStore::with_capacity(config.dimension, config.initial_capacity),
        }
    }

    /// Append a vector and return its ID (the count before the call).
    ///
    /// # Errors
    ///
    /// [`IndexError::DimensionMismatch`] if `vector.len() != dimension`. The
    /// index is unchanged on error.
    pub fn add(&mut self, vector: &[f32]) -> Result<VectorId> {
        self.store.append(vector)
    }

    /// Find the `k` nearest stored vectors to `query`.
    ///
    /// Returns `min(k, count)` matches, ascending by Euclidean distance; equal
    /// distances are ordered by ascending ID.
    ///
    /// # Errors
    ///
    /// [`IndexError::DimensionMismatch`] if `query.len() != dimension`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.validate_query(query)?;

        tracing::trace!(count = self.store.count(), k, "flat search");
        Ok(ranker::top_k(&self.store, query, k))
    }

    /// Find the single nearest stored vector, if any.
    pub fn search_nearest(&self, query: &[f32]) -> Result<Option<Neighbor>> {
        Ok(self.search(query, DEFAULT_K)?.into_iter().next())
    }

    /// Write the index to `path`, replacing any existing file.
    ///
    /// The file is fsynced before returning. A save interrupted midway leaves a
    /// file that [`FlatIndex::load`] rejects as corrupt.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        tracing::info!(
            path = %path.display(),
            dimension = self.dimension(),
            count = self.count(),
            "saved index"
        );
        Ok(())
    }

    /// Replace the index contents with the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::Io`] if the file cannot be opened or read
    /// - [`IndexError::DimensionMismatch`] if the file was written for another
    ///   dimension
    /// - [`IndexError::CorruptData`] if the file is shorter than its header
    ///   declares
    ///
    /// On error the existing contents are left untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        let store = codec::read_store(&mut BufReader::new(file), self.dimension()).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "rejected index file");
            e
        })?;
        self.replace(store, file_len)?;

        tracing::info!(
            path = %path.display(),
            dimension = self.dimension(),
            count = self.count(),
            "loaded index"
        );
        Ok(())
    }

    /// Stream the index to `writer` in file format.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_store(&self.store, writer)
    }

    /// Replace the index contents with data streamed from `reader`.
    ///
    /// Same validation and atomicity as [`FlatIndex::load`].
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        self.store = codec::read_store(reader, self.dimension())?;
        Ok(())
    }

    /// Encode the index into an in-memory buffer in file format.
    pub fn to_bytes(&self) -> Bytes {
        codec::encode_store(&self.store)
    }

    /// Replace the index contents with an in-memory buffer in file format.
    ///
    /// Same validation and atomicity as [`FlatIndex::load`].
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let store = codec::decode_store(bytes, self.dimension())?;
        self.replace(store, bytes.len() as u64)
    }

    fn replace(&mut self, store: FlatStore, source_len: u64) -> Result<()> {
        let used = IndexHeader::for_store(&store).encoded_len()?;
        if source_len > used {
            tracing::warn!(
                trailing = source_len - used,
                "ignoring trailing bytes after index payload"
            );
        }
        self.store = store;
        Ok(())
    }

    /// Read-only view of vector `id`, or `None` if out of range.
    pub fn get(&self, id: VectorId) -> Option<&[f32]> {
        self.store.get(id)
    }

    /// Iterate over `(id, vector)` pairs in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (VectorId, &[f32])> + '_ {
        self.store.iter().enumerate()
    }

    /// Number of stored vectors.
    pub fn count(&self) -> usize {
        self.store.count()
    }

    /// Alias for [`FlatIndex::count`].
    pub fn len(&self) -> usize {
        self.store.count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Configured number of components per vector.
    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    fn validate_query(&self, query: &[f32]) -> Result<()> {
        if query.len() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_index() -> FlatIndex {
        FlatIndex::new(3)
    }

    #[test]
    fn test_initialization() {
        let index = FlatIndex::new(128);
        assert_eq!(index.dimension(), 128);
        assert_eq!(index.count(), 0);
        assert!(index.is_empty());
    }

    #[test]
    #[should_panic(expected = "dimension must be positive")]
    fn test_new_zero_dimension_panics() {
        let _ = FlatIndex::new(0);
    }

    #[test]
    fn test_with_config_rejects_zero_dimension() {
        let result = FlatIndex::with_config(IndexConfig::new(0));
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_with_config_rejects_oversized_capacity() {
        let config: IndexConfig =
            serde_json::from_str(r#"{"dimension": 128, "initial_capacity": 18446744073709551615}"#)
                .unwrap();

        let result = FlatIndex::with_config(config);
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_add_returns_insertion_ids() {
        let mut index = create_test_index();

        assert_eq!(index.add(&[1.0, 0.0, 0.0]).unwrap(), 0);
        assert_eq!(index.add(&[0.0, 1.0, 0.0]).unwrap(), 1);
        assert_eq!(index.count(), 2);
        assert_eq!(index.get(1), Some(&[0.0, 1.0, 0.0][..]));
        assert_eq!(index.get(2), None);
    }

    #[test]
    fn test_add_and_search() {
        let mut index = create_test_index();
        index.add(&[1.0, 0.0, 0.0]).unwrap();
        index.add(&[0.0, 1.0, 0.0]).unwrap();

        // sqrt((1 - 0.9)^2 + (0 - 0.1)^2) = sqrt(0.02)
        let results = index.search(&[0.9, 0.1, 0.0], 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 0);
        assert!((results[0].distance - 0.1414).abs() < 1e-4);
    }

    #[test]
    fn test_search_exact_match_first() {
        let mut index = create_test_index();
        index.add(&[0.0, 0.0, 0.0]).unwrap();
        index.add(&[1.0, 1.0, 1.0]).unwrap();
        index.add(&[10.0, 10.0, 10.0]).unwrap();

        let results = index.search(&[1.0, 1.0, 1.0], 3).unwrap();
        assert_eq!(results[0].id, 1);
        assert_eq!(results[0].distance, 0.0);
        assert_eq!(results[1].id, 0);
        assert_eq!(results[2].id, 2);
    }

    #[test]
    fn test_search_nearest() {
        let mut index = create_test_index();
        assert_eq!(index.search_nearest(&[0.0, 0.0, 0.0]).unwrap(), None);

        index.add(&[5.0, 5.0, 5.0]).unwrap();
        index.add(&[1.0, 1.0, 1.0]).unwrap();
        let nearest = index.search_nearest(&[0.0, 0.0, 0.0]).unwrap().unwrap();
        assert_eq!(nearest.id, 1);
    }

    #[test]
    fn test_search_top_k() {
        let mut index = create_test_index();
        for i in 0..10 {
            index.add(&[i as f32, 0.0, 0.0]).unwrap();
        }

        let results = index.search(&[0.0, 0.0, 0.0], 3).unwrap();
        let ids: Vec<_> = results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_k_larger_than_count() {
        let mut index = create_test_index();
        index.add(&[1.0, 2.0, 3.0]).unwrap();
        index.add(&[4.0, 5.0, 6.0]).unwrap();

        assert_eq!(index.search(&[0.0, 0.0, 0.0], 100).unwrap().len(), 2);
    }

    #[test]
    fn test_search_empty_index() {
        let index = create_test_index();
        let results = index.search(&[1.0, 2.0, 3.0], 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_nan_distance_after_infinite() {
        let mut index = FlatIndex::new(1);
        index.add(&[1.0]).unwrap();
        index.add(&[f32::INFINITY]).unwrap();

        let results = index.search(&[f32::INFINITY], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 0);
        assert_eq!(results[0].distance, f32::INFINITY);
        assert_eq!(results[1].id, 1);
        assert!(results[1].distance.is_nan());

        let nearest = index.search_nearest(&[f32::INFINITY]).unwrap();
        assert_eq!(nearest.map(|n| n.id), Some(0));
    }

    #[test]
    fn test_search_k_zero() {
        let mut index = create_test_index();
        index.add(&[1.0, 2.0, 3.0]).unwrap();

        let results = index.search(&[1.0, 2.0, 3.0], 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = FlatIndex::new(5);

        let result = index.add(&[1.0, 2.0]);
        assert!(matches!(result, Err(IndexError::DimensionMismatch { .. })));
        assert_eq!(index.count(), 0);

        index.add(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let result = index.search(&[1.0, 2.0], 1);
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch {
                expected: 5,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test_index.bin");

        {
            let mut index = FlatIndex::new(2);
            index.add(&[10.0, 20.0]).unwrap();
            index.add(&[30.0, 40.0]).unwrap();
            index.save(&path).unwrap();
        }

        let mut loaded = FlatIndex::new(2);
        loaded.load(&path).unwrap();
        assert_eq!(loaded.count(), 2);

        let results = loaded.search(&[10.1, 20.1], 1).unwrap();
        assert_eq!(results[0].id, 0);
    }

    #[test]
    fn test_load_replaces_not_merges() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("one.bin");

        let mut source = FlatIndex::new(2);
        source.add(&[1.0, 1.0]).unwrap();
        source.save(&path).unwrap();

        let mut target = FlatIndex::new(2);
        for i in 0..5 {
            target.add(&[i as f32, 0.0]).unwrap();
        }
        target.load(&path).unwrap();

        assert_eq!(target.count(), 1);
        assert_eq!(target.get(0), Some(&[1.0, 1.0][..]));
        assert_eq!(target.add(&[2.0, 2.0]).unwrap(), 1);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mut index = create_test_index();
        index.add(&[1.0, 2.0, 3.0]).unwrap();

        let result = index.load(dir.path().join("missing.bin"));
        assert!(matches!(result, Err(IndexError::Io(_))));
        assert_eq!(index.count(), 1);
    }

    #[test]
    fn test_save_to_unwritable_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        let index = create_test_index();

        let result = index.save(dir.path().join("no_such_dir").join("index.bin"));
        assert!(matches!(result, Err(IndexError::Io(_))));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let mut index = create_test_index();
        index.add(&[1.0, 2.0, 3.0]).unwrap();
        index.add(&[-1.0, 0.5, 8.0]).unwrap();

        let bytes = index.to_bytes();
        let mut restored = create_test_index();
        restored.load_bytes(&bytes).unwrap();

        assert_eq!(restored.count(), 2);
        assert_eq!(restored.get(1), index.get(1));
    }

    #[test]
    fn test_load_bytes_failure_keeps_contents() {
        let mut other = FlatIndex::new(4);
        other.add(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let foreign = other.to_bytes();

        let mut index = create_test_index();
        index.add(&[7.0, 8.0, 9.0]).unwrap();

        let result = index.load_bytes(&foreign);
        assert!(matches!(result, Err(IndexError::DimensionMismatch { .. })));

        let own = index.to_bytes();
        let result = index.load_bytes(&own[..20]);
        assert!(matches!(result, Err(IndexError::CorruptData(_))));

        assert_eq!(index.count(), 1);
        assert_eq!(index.get(0), Some(&[7.0, 8.0, 9.0][..]));
    }

    #[test]
    fn test_write_to_read_from() {
        let mut index = create_test_index();
        index.add(&[3.0, 2.0, 1.0]).unwrap();

        let mut buf = Vec::new();
        index.write_to(&mut buf).unwrap();

        let mut restored = create_test_index();
        restored.read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(restored.get(0), Some(&[3.0, 2.0, 1.0][..]));
    }

    #[test]
    fn test_iter() {
        let mut index = FlatIndex::new(1);
        index.add(&[5.0]).unwrap();
        index.add(&[6.0]).unwrap();

        let pairs: Vec<_> = index.iter().map(|(id, v)| (id, v[0])).collect();
        assert_eq!(pairs, vec![(0, 5.0), (1, 6.0)]);
    }
}
