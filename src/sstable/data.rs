//! Data block implementation.
//!
//! Each data block entry stores a prefix-compressed internal key and a
//! value:
//!
//! ```text
//! [shared: varint32][non_shared: varint32][value_len: varint32]
//! [key suffix: non_shared bytes]
//! [value: value_len bytes]
//! ```
//!
//! The stored key is the user key followed by an 8-byte little-endian
//! footer packing `(sequence << 8) | value_type`. Prefix sharing applies to
//! the stored key; lookups compare the user key only.

use crate::config::{SeekMode, INTERNAL_KEY_FOOTER_SIZE};
use crate::error::{Error, Result};
use crate::sstable::block::{rebuild_key, Block, EntryCursor};
use crate::sstable::footer::read_array;

/// The type of an entry, from the low byte of the internal key footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// A tombstone
    Deletion,
    /// A normal value
    Value,
    /// A merge operand
    Merge,
    /// A single-delete tombstone
    SingleDeletion,
    /// A range tombstone
    RangeDeletion,
    /// A reference into a blob file
    BlobIndex,
    /// Any other type byte
    Other(u8),
}

impl ValueType {
    /// Converts a u8 to a ValueType.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => ValueType::Deletion,
            0x01 => ValueType::Value,
            0x02 => ValueType::Merge,
            0x07 => ValueType::SingleDeletion,
            0x0f => ValueType::RangeDeletion,
            0x11 => ValueType::BlobIndex,
            other => ValueType::Other(other),
        }
    }
}

/// DataBlock answers exact-match lookups within one data block.
#[derive(Debug, Clone, Copy)]
pub struct DataBlock<'a> {
    block: Block<'a>,
}

impl<'a> DataBlock<'a> {
    /// Create a new DataBlock from raw data, trailer included
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Ok(Self { block: Block::new(data)? })
    }

    /// Get the value stored for `key` by scanning every entry.
    ///
    /// Returns the value of the first entry whose user key equals `key`.
    /// Reaching the end of the block without a match returns `Ok(None)`.
    pub fn get(&self, key: &[u8]) -> Result<Option<&'a [u8]>> {
        self.get_with(key, SeekMode::Linear)
    }

    /// Get the value stored for `key` using the given strategy.
    ///
    /// With `SeekMode::RestartBinarySearch` the scan also stops at the
    /// first key greater than `key`.
    pub fn get_with(&self, key: &[u8], mode: SeekMode) -> Result<Option<&'a [u8]>> {
        let mut iter = self.iter();

        let stop_early = match mode {
            SeekMode::Linear => {
                iter.seek_to_first();
                false
            }
            SeekMode::RestartBinarySearch if self.block.num_restarts() == 0 => {
                iter.seek_to_first();
                true
            }
            SeekMode::RestartBinarySearch => {
                let start = self.last_restart_before(key)?;
                iter.seek_to_restart_point(start)?;
                true
            }
        };

        while iter.advance()? {
            if iter.key() == key {
                return Ok(Some(iter.value()));
            }
            if stop_early && iter.key() > key {
                break;
            }
        }

        Ok(None)
    }

    /// Index of the last restart point whose key is below `key`, or 0.
    fn last_restart_before(&self, key: &[u8]) -> Result<u32> {
        let mut iter = self.iter();
        let mut left = 0;
        let mut right = self.block.num_restarts();

        while left < right {
            let mid = left + (right - left) / 2;
            iter.seek_to_restart_point(mid)?;

            if iter.advance()? && iter.key() < key {
                left = mid + 1;
            } else {
                right = mid;
            }
        }

        Ok(left.saturating_sub(1))
    }

    /// Create an iterator over the block
    pub fn iter(&self) -> DataBlockIterator<'a> {
        DataBlockIterator::new(self.block)
    }
}

/// Iterator over data block entries
pub struct DataBlockIterator<'a> {
    block: Block<'a>,
    current: usize,
    internal_key: Vec<u8>,
    value: &'a [u8],
    valid: bool,
}

impl<'a> DataBlockIterator<'a> {
    fn new(block: Block<'a>) -> Self {
        Self { block, current: 0, internal_key: Vec::new(), value: &[], valid: false }
    }

    /// Seek to the first entry
    pub fn seek_to_first(&mut self) {
        self.reset(0);
    }

    /// Seek to a restart point
    pub fn seek_to_restart_point(&mut self, index: u32) -> Result<()> {
        let offset = self.block.restart_point(index)?;
        self.reset(offset);
        Ok(())
    }

    fn reset(&mut self, offset: usize) {
        self.internal_key.clear();
        self.value = &[];
        self.current = offset;
        self.valid = false;
    }

    /// Move to the next entry.
    ///
    /// Returns `Ok(false)` once the entries region is exhausted.
    pub fn advance(&mut self) -> Result<bool> {
        self.valid = false;

        let mut cursor = EntryCursor::new(self.block.entries(), self.current);
        if cursor.at_end() {
            return Ok(false);
        }

        let shared = cursor.varint32()? as usize;
        let non_shared = cursor.varint32()? as usize;
        let value_len = cursor.varint32()? as usize;
        let suffix = cursor.bytes(non_shared)?;
        let value = cursor.bytes(value_len)?;

        rebuild_key(&mut self.internal_key, shared, suffix)?;
        if self.internal_key.len() < INTERNAL_KEY_FOOTER_SIZE {
            return Err(Error::format(format!(
                "data block key at offset {} is {} bytes, shorter than its {}-byte footer",
                self.current,
                self.internal_key.len(),
                INTERNAL_KEY_FOOTER_SIZE
            )));
        }

        self.value = value;
        self.current = cursor.position();
        self.valid = true;
        Ok(true)
    }

    /// Check if the iterator is valid
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Get the current user key
    pub fn key(&self) -> &[u8] {
        assert!(self.valid, "Iterator not valid");
        &self.internal_key[..self.internal_key.len() - INTERNAL_KEY_FOOTER_SIZE]
    }

    /// Get the current value
    pub fn value(&self) -> &'a [u8] {
        assert!(self.valid, "Iterator not valid");
        self.value
    }

    fn packed_footer(&self) -> u64 {
        assert!(self.valid, "Iterator not valid");
        let offset = self.internal_key.len() - INTERNAL_KEY_FOOTER_SIZE;
        u64::from_le_bytes(read_array(&self.internal_key[offset..]))
    }

    /// Get the current sequence number
    pub fn sequence(&self) -> u64 {
        self.packed_footer() >> 8
    }

    /// Get the current value type
    pub fn value_type(&self) -> ValueType {
        ValueType::from_u8(self.packed_footer() as u8)
    }
}
