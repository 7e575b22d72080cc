//! Table footer implementation.
//!
//! The footer is a fixed-size (53 bytes) structure at the end of a table
//! file that locates the metaindex block and the index block.

use crate::coding::{decode_varint64, put_varint64};
use crate::config::{
    ChecksumType, BLOCK_TRAILER_SIZE, FOOTER_HANDLES_SIZE, FOOTER_SIZE, FORMAT_VERSION,
    MAGIC_NUMBER,
};
use crate::error::{Error, Result};
use bytes::BufMut;
use serde::Serialize;
use std::fmt;

/// BlockHandle represents a pointer to a block in the table file.
///
/// `size` covers the block contents only; the 5-byte trailer that follows
/// every block is not included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockHandle {
    /// Offset of the block in the file
    pub offset: u64,
    /// Size of the block in bytes, excluding the trailer
    pub size: u64,
}

impl BlockHandle {
    /// Create a new BlockHandle
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Decode a BlockHandle stored as two varint64 values.
    ///
    /// Returns the handle and the number of bytes consumed.
    pub fn decode_from(data: &[u8]) -> Result<(Self, usize)> {
        let (offset, n1) = decode_varint64(data)?;
        let (size, n2) = decode_varint64(&data[n1..])?;
        Ok((Self { offset, size }, n1 + n2))
    }

    /// Append the two-varint encoding of this handle.
    pub fn encode_to<B: BufMut>(&self, dst: &mut B) {
        put_varint64(dst, self.offset);
        put_varint64(dst, self.size);
    }

    /// Get the end offset of the block contents
    pub fn end_offset(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }

    /// Byte range of the block including its trailer, or `None` if the
    /// arithmetic overflows.
    pub fn range_with_trailer(&self) -> Option<(u64, u64)> {
        let end = self
            .offset
            .checked_add(self.size)?
            .checked_add(BLOCK_TRAILER_SIZE as u64)?;
        Some((self.offset, end))
    }

    /// Handle of the block stored right after this one when its size
    /// differs by `delta`. Used by delta-encoded index entries.
    pub fn next_with_delta(&self, delta: i64) -> Option<Self> {
        let (_, offset) = self.range_with_trailer()?;
        let size = self.size.checked_add_signed(delta)?;
        Some(Self { offset, size })
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHandle(offset={}, size={})", self.offset, self.size)
    }
}

/// Footer is the last 53 bytes of a table file.
///
/// Format:
/// ```text
/// [checksum_type: 1 byte]
/// [metaindex_handle: varint64 offset, varint64 size]
/// [index_handle: varint64 offset, varint64 size]
/// [padding up to 40 bytes of handles]
/// [format_version: u32 LE]
/// [magic: u64 LE]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    /// Raw checksum type byte
    pub checksum_type: u8,
    /// Handle to the metaindex block
    pub metaindex_handle: BlockHandle,
    /// Handle to the index block
    pub index_handle: BlockHandle,
    /// Format version, always `FORMAT_VERSION` once decoded
    pub format_version: u32,
}

impl Footer {
    /// Create a new Footer for the supported format version
    pub fn new(
        checksum_type: u8,
        metaindex_handle: BlockHandle,
        index_handle: BlockHandle,
    ) -> Self {
        Self { checksum_type, metaindex_handle, index_handle, format_version: FORMAT_VERSION }
    }

    /// The checksum algorithm, if the byte names a known one.
    pub fn checksum(&self) -> Option<ChecksumType> {
        ChecksumType::from_u8(self.checksum_type)
    }

    /// Encode the footer to bytes (53 bytes)
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FOOTER_SIZE);
        buf.put_u8(self.checksum_type);

        self.metaindex_handle.encode_to(&mut buf);
        self.index_handle.encode_to(&mut buf);
        buf.resize(1 + FOOTER_HANDLES_SIZE, 0);

        buf.put_u32_le(self.format_version);
        buf.put_u64_le(MAGIC_NUMBER);
        buf
    }

    /// Decode the footer from the tail of a complete table file.
    pub fn decode_from_file(file: &[u8]) -> Result<Self> {
        if file.len() < FOOTER_SIZE {
            return Err(Error::format(format!(
                "file too short for footer: {} bytes, need {}",
                file.len(),
                FOOTER_SIZE
            )));
        }
        Self::decode(&file[file.len() - FOOTER_SIZE..])
    }

    /// Decode a footer from exactly `FOOTER_SIZE` bytes
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != FOOTER_SIZE {
            return Err(Error::format(format!(
                "footer size mismatch: expected {}, got {}",
                FOOTER_SIZE,
                data.len()
            )));
        }

        let magic = u64::from_le_bytes(read_array(&data[45..53]));
        if magic != MAGIC_NUMBER {
            return Err(Error::format(format!(
                "invalid table magic number: expected {:#x}, got {:#x}",
                MAGIC_NUMBER, magic
            )));
        }

        let format_version = u32::from_le_bytes(read_array(&data[41..45]));
        if format_version != FORMAT_VERSION {
            return Err(Error::format(format!(
                "unsupported format version: expected {}, got {}",
                FORMAT_VERSION, format_version
            )));
        }

        // Handles must decode within their 40-byte region.
        let handles = &data[1..1 + FOOTER_HANDLES_SIZE];
        let (metaindex_handle, n) = BlockHandle::decode_from(handles)?;
        let (index_handle, _) = BlockHandle::decode_from(&handles[n..])?;

        Ok(Self { checksum_type: data[0], metaindex_handle, index_handle, format_version })
    }
}

/// Copy a fixed-width little-endian field out of a slice whose length the
/// caller has already checked.
pub(crate) fn read_array<const N: usize>(data: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&data[..N]);
    buf
}
