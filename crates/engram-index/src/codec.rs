//! Flat binary index format.
//!
//! # File Layout
//!
//! ```text
//! Offset   Size      Type        Description
//! ───────────────────────────────────────────────────────
//! 0x00     8         u64 LE      D: dimension
//! 0x08     8         u64 LE      N: vector count
//! 0x10     N*D*4     [f32 LE]    Vector data, store order
//! ```
//!
//! No magic, version or checksum. The header fields are fixed-width, which
//! matches the legacy native `size_t` layout on 64-bit little-endian hosts.
//!
//! Decoding validates in this order, and stops at the first failure:
//!
//! 1. header present (16 bytes), else `CorruptData`
//! 2. header dimension equals the target dimension, else `DimensionMismatch`
//! 3. payload holds `N * D` values, else `CorruptData`
//!
//! Bytes after the declared payload are ignored.

use crate::error::{IndexError, Result};
use crate::store::FlatStore;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::{Read, Write};

/// Header size in bytes: 8 (dimension) + 8 (count).
pub const HEADER_SIZE: usize = 16;

/// Bytes per stored scalar.
pub const SCALAR_SIZE: usize = std::mem::size_of::<f32>();

/// Scalars encoded per `write_all` call when streaming.
const WRITE_CHUNK_SCALARS: usize = 16 * 1024;

/// Parsed index header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub dimension: u64,
    pub count: u64,
}

impl IndexHeader {
    /// Header describing the current contents of `store`.
    pub fn for_store(store: &FlatStore) -> Self {
        Self {
            dimension: store.dimension() as u64,
            count: store.count() as u64,
        }
    }

    /// Encode header to bytes.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.dimension);
        buf.put_u64_le(self.count);
    }

    /// Decode header from bytes.
    pub fn decode(buf: &mut &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(IndexError::CorruptData(format!(
                "header truncated: {} of {} bytes",
                buf.len(),
                HEADER_SIZE
            )));
        }

        let dimension = buf.get_u64_le();
        let count = buf.get_u64_le();

        Ok(Self { dimension, count })
    }

    /// Number of payload bytes the header declares.
    pub fn payload_len(&self) -> Result<u64> {
        self.dimension
            .checked_mul(self.count)
            .and_then(|n| n.checked_mul(SCALAR_SIZE as u64))
            .ok_or_else(|| {
                IndexError::CorruptData(format!(
                    "declared size overflows: {} vectors x {} dimensions",
                    self.count, self.dimension
                ))
            })
    }

    /// Total encoded size, header included.
    pub fn encoded_len(&self) -> Result<u64> {
        self.payload_len()?
            .checked_add(HEADER_SIZE as u64)
            .ok_or_else(|| IndexError::CorruptData("declared size overflows".to_string()))
    }
}

/// Stream `store` to `writer` in index format.
///
/// The writer is not flushed.
pub fn write_store<W: Write>(store: &FlatStore, writer: &mut W) -> Result<()> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE);
    IndexHeader::for_store(store).encode(&mut buf);
    writer.write_all(&buf)?;

    for chunk in store.as_slice().chunks(WRITE_CHUNK_SCALARS) {
        buf.clear();
        buf.reserve(chunk.len() * SCALAR_SIZE);
        for &value in chunk {
            buf.put_f32_le(value);
        }
        writer.write_all(&buf)?;
    }

    Ok(())
}

/// Read a store of `expected_dimension` vectors from `reader`.
///
/// At most the declared payload is read; a header that overstates the
/// payload cannot force a large allocation.
pub fn read_store<R: Read>(reader: &mut R, expected_dimension: usize) -> Result<FlatStore> {
    let mut header_bytes = Vec::with_capacity(HEADER_SIZE);
    reader
        .by_ref()
        .take(HEADER_SIZE as u64)
        .read_to_end(&mut header_bytes)?;
    let header = IndexHeader::decode(&mut header_bytes.as_slice())?;

    if header.dimension != expected_dimension as u64 {
        return Err(IndexError::DimensionMismatch {
            expected: expected_dimension,
            actual: usize::try_from(header.dimension).unwrap_or(usize::MAX),
        });
    }

    let payload_len = header.payload_len()?;
    let mut payload = Vec::new();
    reader.by_ref().take(payload_len).read_to_end(&mut payload)?;

    if (payload.len() as u64) < payload_len {
        return Err(IndexError::CorruptData(format!(
            "payload truncated: header declares {} vectors ({} bytes), found {} bytes",
            header.count,
            payload_len,
            payload.len()
        )));
    }

    // The payload is in memory, so the count fits in usize.
    let count = header.count as usize;
    let mut data = Vec::with_capacity(payload.len() / SCALAR_SIZE);
    let mut buf = payload.as_slice();
    while buf.has_remaining() {
        data.push(buf.get_f32_le());
    }

    Ok(FlatStore::from_raw(expected_dimension, count, data))
}

/// Encode `store` into an in-memory buffer.
pub fn encode_store(store: &FlatStore) -> Bytes {
    let header = IndexHeader::for_store(store);
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + store.as_slice().len() * SCALAR_SIZE);
    header.encode(&mut buf);
    for &value in store.as_slice() {
        buf.put_f32_le(value);
    }
    buf.freeze()
}

/// Decode a store from an in-memory buffer.
pub fn decode_store(mut bytes: &[u8], expected_dimension: usize) -> Result<FlatStore> {
    read_store(&mut bytes, expected_dimension)
}
