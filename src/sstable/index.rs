//! Index block implementation.
//!
//! The index block maps separator keys to data block handles. Each
//! separator is at least the last key of its data block and below the
//! first key of the next one, so the first entry whose key is not less
//! than a search key names the only block that may hold it.
//!
//! Handles are delta encoded: an entry that shares no key prefix with its
//! predecessor (every restart entry does) stores the full handle as two
//! varint64 values. Any other entry stores only the signed size difference
//! from the previous handle; its offset follows the previous block and its
//! trailer.
//!
//! Index keys are compared as plain user keys. Hash-indexed or
//! partitioned index blocks are not supported.

use crate::config::SeekMode;
use crate::error::{Error, Result};
use crate::sstable::block::{rebuild_key, Block, EntryCursor};
use crate::sstable::footer::BlockHandle;

/// IndexBlock locates the data block that may contain a key.
#[derive(Debug, Clone, Copy)]
pub struct IndexBlock<'a> {
    block: Block<'a>,
}

impl<'a> IndexBlock<'a> {
    /// Create a new IndexBlock from raw data, trailer included
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Ok(Self { block: Block::new(data)? })
    }

    /// Find the block handle for a given key by scanning every entry.
    ///
    /// Returns the handle of the first entry whose key is not less than
    /// `key`. If every entry is smaller, the last entry's handle is
    /// returned. Returns `None` only for an index without entries.
    pub fn find_block(&self, key: &[u8]) -> Result<Option<BlockHandle>> {
        self.find_block_with(key, SeekMode::Linear)
    }

    /// Find the block handle for a given key using the given strategy.
    pub fn find_block_with(&self, key: &[u8], mode: SeekMode) -> Result<Option<BlockHandle>> {
        let mut iter = self.iter();

        match mode {
            SeekMode::RestartBinarySearch if self.block.num_restarts() > 0 => {
                let start = self.last_restart_before(key)?;
                iter.seek_to_restart_point(start)?;
            }
            // No restart array to search: scan from the start.
            _ => iter.seek_to_first(),
        }

        let mut last_handle = None;
        while iter.advance()? {
            if iter.key() >= key {
                return Ok(Some(iter.handle()));
            }
            last_handle = Some(iter.handle());
        }

        // Every entry is below the key: it can only be in the last block.
        Ok(last_handle)
    }

    /// Index of the last restart point whose key is below `key`, or 0.
    fn last_restart_before(&self, key: &[u8]) -> Result<u32> {
        let mut iter = self.iter();
        let mut left = 0;
        let mut right = self.block.num_restarts();

        while left < right {
            let mid = left + (right - left) / 2;
            iter.seek_to_restart_point(mid)?;

            // A restart point sitting at the end of the entries is past any key.
            if iter.advance()? && iter.key() < key {
                left = mid + 1;
            } else {
                right = mid;
            }
        }

        Ok(left.saturating_sub(1))
    }

    /// Create an iterator over all index entries
    pub fn iter(&self) -> IndexIterator<'a> {
        IndexIterator::new(self.block)
    }

    /// Get the number of entries in the index
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        let mut iter = self.iter();
        iter.seek_to_first();
        while iter.advance()? {
            count += 1;
        }
        Ok(count)
    }

    /// Check if the index has no entries
    pub fn is_empty(&self) -> bool {
        self.block.entries().is_empty()
    }
}

/// Iterator over index entries.
///
/// Each step rebuilds the entry's key from the previous key and its handle
/// from the previous handle, so positioning is only possible at the start
/// of the block or at a restart point.
pub struct IndexIterator<'a> {
    block: Block<'a>,
    current: usize,
    key: Vec<u8>,
    handle: Option<BlockHandle>,
    valid: bool,
}

impl<'a> IndexIterator<'a> {
    fn new(block: Block<'a>) -> Self {
        Self { block, current: 0, key: Vec::new(), handle: None, valid: false }
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
        self.key.clear();
        self.handle = None;
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
        let suffix = cursor.bytes(non_shared)?;
        rebuild_key(&mut self.key, shared, suffix)?;

        let handle = if shared == 0 {
            BlockHandle::new(cursor.varint64()?, cursor.varint64()?)
        } else {
            let delta = cursor.varsignedint64()?;
            let prev = self.handle.ok_or_else(|| {
                Error::format(format!(
                    "index entry at offset {} is delta encoded without a preceding handle",
                    self.current
                ))
            })?;
            prev.next_with_delta(delta).ok_or_else(|| {
                Error::format(format!("index size delta {} out of range for {}", delta, prev))
            })?
        };

        self.handle = Some(handle);
        self.current = cursor.position();
        self.valid = true;
        Ok(true)
    }

    /// Check if the iterator is valid
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Get the current key
    pub fn key(&self) -> &[u8] {
        assert!(self.valid, "Iterator not valid");
        &self.key
    }

    /// Get the current data block handle
    pub fn handle(&self) -> BlockHandle {
        assert!(self.valid, "Iterator not valid");
        self.handle.expect("valid iterator has a handle")
    }
}
