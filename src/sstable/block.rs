//! Block framing for table files.
//!
//! A block holds prefix-compressed entries followed by a restart array.
//! Index and data blocks share this framing and differ only in how each
//! entry's value is encoded.

use crate::coding::{decode_varint32, decode_varint64, decode_varsignedint64};
use crate::config::{
    CompressionType, BLOCK_FOOTER_SIZE, BLOCK_TRAILER_SIZE, NUM_RESTARTS_MASK,
};
use crate::error::{Error, Result};
use crate::sstable::footer::read_array;

/// Block is a borrowed view over one block and its trailer.
///
/// Format:
/// ```text
/// [Entry 1]
/// ...
/// [Entry N]
/// [Restart Point 1: u32 LE]
/// ...
/// [Restart Point M: u32 LE]
/// [Block Footer: u32 LE, low 31 bits = M]
/// [Trailer: type u8, checksum u32]
/// ```
///
/// The top bit of the block footer would select a hash index for data
/// blocks. It is ignored: every block is read as a plain binary-search
/// block, and the trailer checksum is never verified.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    data: &'a [u8],
    entries_end: usize,
    num_restarts: u32,
}

impl<'a> Block<'a> {
    /// Frame a block from its bytes, trailer included.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let min_len = BLOCK_FOOTER_SIZE + BLOCK_TRAILER_SIZE;
        if data.len() < min_len {
            return Err(Error::format(format!(
                "block too small: {} bytes, need at least {}",
                data.len(),
                min_len
            )));
        }

        let footer_offset = data.len() - min_len;
        let raw_footer = u32::from_le_bytes(read_array(&data[footer_offset..]));
        let num_restarts = raw_footer & NUM_RESTARTS_MASK;

        // entries_end = len - trailer - footer - 4 * num_restarts
        let entries_end = (num_restarts as usize)
            .checked_mul(4)
            .and_then(|restart_bytes| footer_offset.checked_sub(restart_bytes))
            .ok_or_else(|| {
                Error::format(format!(
                    "restart array of {} entries does not fit in block of {} bytes",
                    num_restarts,
                    data.len()
                ))
            })?;

        let block = Self { data, entries_end, num_restarts };

        let compression_type = block.trailer().compression_type;
        if compression_type != CompressionType::None as u8 {
            log::warn!(
                "Block trailer reports compression type {:#x} ({:?}); scanning raw bytes",
                compression_type,
                CompressionType::from_u8(compression_type)
            );
        }

        Ok(block)
    }

    /// Get the number of restart points
    pub fn num_restarts(&self) -> u32 {
        self.num_restarts
    }

    /// Get a restart point (an offset into the entries region) by index
    pub fn restart_point(&self, index: u32) -> Result<usize> {
        if index >= self.num_restarts {
            return Err(Error::format(format!(
                "restart index {} out of range ({} restarts)",
                index, self.num_restarts
            )));
        }

        let offset = self.entries_end + index as usize * 4;
        let point = u32::from_le_bytes(read_array(&self.data[offset..])) as usize;
        if point > self.entries_end {
            return Err(Error::format(format!(
                "restart point {} beyond entries region of {} bytes",
                point, self.entries_end
            )));
        }
        Ok(point)
    }

    /// The entries region.
    pub fn entries(&self) -> &'a [u8] {
        &self.data[..self.entries_end]
    }

    /// The trailer following the block contents.
    pub fn trailer(&self) -> BlockTrailer {
        let offset = self.data.len() - BLOCK_TRAILER_SIZE;
        BlockTrailer {
            compression_type: self.data[offset],
            checksum: u32::from_le_bytes(read_array(&self.data[offset + 1..])),
        }
    }

    /// Get the raw data, trailer included
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// The 5-byte trailer stored after every block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTrailer {
    /// Raw compression type byte
    pub compression_type: u8,
    /// Stored checksum, never verified
    pub checksum: u32,
}

impl BlockTrailer {
    /// The compression type, if the byte names a known one.
    pub fn compression(&self) -> Option<CompressionType> {
        CompressionType::from_u8(self.compression_type)
    }
}

/// Bounds-checked reader over an entries region.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntryCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> EntryCursor<'a> {
    pub(crate) fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn varint32(&mut self) -> Result<u32> {
        let (value, len) = decode_varint32(&self.data[self.pos..])?;
        self.pos += len;
        Ok(value)
    }

    pub(crate) fn varint64(&mut self) -> Result<u64> {
        let (value, len) = decode_varint64(&self.data[self.pos..])?;
        self.pos += len;
        Ok(value)
    }

    pub(crate) fn varsignedint64(&mut self) -> Result<i64> {
        let (value, len) = decode_varsignedint64(&self.data[self.pos..])?;
        self.pos += len;
        Ok(value)
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::format(format!(
                    "entry at offset {} needs {} bytes, only {} left in entries region",
                    self.pos,
                    len,
                    self.data.len() - self.pos
                ))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

/// Rebuild a prefix-compressed key in place: keep `shared` bytes of the
/// previous key and append `suffix`.
pub(crate) fn rebuild_key(key: &mut Vec<u8>, shared: usize, suffix: &[u8]) -> Result<()> {
    if shared > key.len() {
        return Err(Error::format(format!(
            "entry shares {} bytes with a previous key of {} bytes",
            shared,
            key.len()
        )));
    }
    key.truncate(shared);
    key.extend_from_slice(suffix);
    Ok(())
}
