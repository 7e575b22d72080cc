//! Table reader implementation.
//!
//! Runs a point lookup over a fully loaded table file: footer, then index
//! block, then the one data block that may hold the key. Nothing is cached
//! between lookups, so a reader is cheap to build and a shared buffer can
//! serve lookups from any number of threads.

use crate::config::ReadOptions;
use crate::error::{Error, Result};
use crate::sstable::data::DataBlock;
use crate::sstable::footer::{BlockHandle, Footer};
use crate::sstable::index::IndexBlock;
use bytes::Bytes;
use std::path::Path;

/// TableReader provides point lookups over a table file held in memory.
///
/// Usage:
/// ```no_run
/// use sstlookup::sstable::{read_table_file, TableReader};
///
/// let file = read_table_file("table.sst").unwrap();
/// let reader = TableReader::new(&file).unwrap();
/// if let Some(value) = reader.get(b"key1").unwrap() {
///     println!("Found: {:?}", value);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TableReader<'a> {
    data: &'a [u8],
    footer: Footer,
    options: ReadOptions,
}

/// Everything a lookup touched, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTrace<'a> {
    /// Handle of the metaindex block, from the footer
    pub metaindex_handle: BlockHandle,
    /// Handle of the index block, from the footer
    pub index_handle: BlockHandle,
    /// Data block chosen by the index, if the index has entries
    pub data_handle: Option<BlockHandle>,
    /// The value found, if any
    pub value: Option<&'a [u8]>,
}

impl<'a> TableReader<'a> {
    /// Decode the footer of `data` with default options
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Self::with_options(data, ReadOptions::default())
    }

    /// Decode the footer of `data`
    pub fn with_options(data: &'a [u8], options: ReadOptions) -> Result<Self> {
        let footer = Footer::decode_from_file(data)?;
        log::debug!(
            "Table footer: metaindex {}, index {}, checksum type {}",
            footer.metaindex_handle,
            footer.index_handle,
            footer.checksum_type
        );
        Ok(Self { data, footer, options })
    }

    /// The decoded footer
    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    /// Size of the underlying file in bytes
    pub fn file_size(&self) -> usize {
        self.data.len()
    }

    /// Slice out the block `handle` points to, trailer included.
    pub fn block(&self, handle: &BlockHandle) -> Result<&'a [u8]> {
        let out_of_bounds = || {
            Error::format(format!(
                "{} plus trailer exceeds file of {} bytes",
                handle,
                self.data.len()
            ))
        };

        let (start, end) = handle.range_with_trailer().ok_or_else(out_of_bounds)?;
        if end > self.data.len() as u64 {
            return Err(out_of_bounds());
        }
        Ok(&self.data[start as usize..end as usize])
    }

    /// Find the handle of the data block that may contain `key`.
    pub fn find_data_block(&self, key: &[u8]) -> Result<Option<BlockHandle>> {
        let index = IndexBlock::new(self.block(&self.footer.index_handle)?)?;
        index.find_block_with(key, self.options.seek_mode)
    }

    /// Get the value for a key
    pub fn get(&self, key: &[u8]) -> Result<Option<&'a [u8]>> {
        Ok(self.lookup(key)?.value)
    }

    /// Get the value for a key along with the handles visited on the way.
    pub fn lookup(&self, key: &[u8]) -> Result<LookupTrace<'a>> {
        let mut trace = LookupTrace {
            metaindex_handle: self.footer.metaindex_handle,
            index_handle: self.footer.index_handle,
            data_handle: None,
            value: None,
        };

        let handle = match self.find_data_block(key)? {
            Some(h) => h,
            None => {
                log::debug!("Index block has no entries");
                return Ok(trace);
            }
        };
        log::debug!("Data block for key: {}", handle);
        trace.data_handle = Some(handle);

        let block = DataBlock::new(self.block(&handle)?)?;
        trace.value = block.get_with(key, self.options.seek_mode)?;
        Ok(trace)
    }
}

/// Load a whole table file into memory.
pub fn read_table_file<P: AsRef<Path>>(path: P) -> Result<Bytes> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    log::debug!("Read {} bytes from {:?}", data.len(), path);
    Ok(Bytes::from(data))
}
