// Fixture writer for table files used by the integration tests and benches.
//
// Produces format version 5 files: data blocks whose keys carry an 8-byte
// internal key footer, a delta-encoded index block keyed by the last user
// key of each data block, an empty metaindex block and a valid footer.

#![allow(dead_code)]

use bytes::{BufMut, BytesMut};
use sstlookup::coding::{put_varint32, put_varsignedint64};
use sstlookup::{BlockHandle, Footer};

/// Shared prefix length of two byte strings
pub fn shared_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Prefix-compressed block under construction
struct BlockWriter {
    buffer: BytesMut,
    restarts: Vec<u32>,
    counter: usize,
    last_key: Vec<u8>,
    restart_interval: usize,
}

impl BlockWriter {
    fn new(restart_interval: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            restarts: vec![0],
            counter: 0,
            last_key: Vec::new(),
            restart_interval,
        }
    }

    /// Write the key header and suffix, returning the shared length.
    fn put_key(&mut self, key: &[u8], value_len: Option<usize>) -> usize {
        let mut shared = 0;
        if self.counter >= self.restart_interval {
            self.restarts.push(self.buffer.len() as u32);
            self.counter = 0;
        } else if self.counter > 0 {
            shared = shared_prefix_len(&self.last_key, key);
        }

        put_varint32(&mut self.buffer, shared as u32);
        put_varint32(&mut self.buffer, (key.len() - shared) as u32);
        if let Some(len) = value_len {
            put_varint32(&mut self.buffer, len as u32);
        }
        self.buffer.put_slice(&key[shared..]);

        self.last_key.clear();
        self.last_key.extend_from_slice(key);
        self.counter += 1;
        shared
    }

    fn add_data(&mut self, internal_key: &[u8], value: &[u8]) {
        self.put_key(internal_key, Some(value.len()));
        self.buffer.put_slice(value);
    }

    fn add_index(&mut self, key: &[u8], handle: BlockHandle, prev: Option<BlockHandle>) {
        let shared = self.put_key(key, None);
        match prev {
            Some(prev) if shared > 0 => {
                put_varsignedint64(&mut self.buffer, handle.size as i64 - prev.size as i64)
            }
            _ => handle.encode_to(&mut self.buffer),
        }
    }

    fn is_empty(&self) -> bool {
        self.counter == 0 && self.restarts.len() == 1
    }

    fn current_size(&self) -> usize {
        self.buffer.len() + self.restarts.len() * 4 + 4
    }

    /// Block contents without trailer
    fn finish(mut self) -> BytesMut {
        for restart in &self.restarts {
            self.buffer.put_u32_le(*restart);
        }
        self.buffer.put_u32_le(self.restarts.len() as u32);
        self.buffer
    }
}

/// Builds a whole table file in memory.
pub struct TableWriter {
    file: BytesMut,
    data_block: BlockWriter,
    index: Vec<(Vec<u8>, BlockHandle)>,
    last_key: Vec<u8>,
    block_size: usize,
    restart_interval: usize,
    index_restart_interval: usize,
    sequence: u64,
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableWriter {
    pub fn new() -> Self {
        Self {
            file: BytesMut::new(),
            data_block: BlockWriter::new(16),
            index: Vec::new(),
            last_key: Vec::new(),
            block_size: 4096,
            restart_interval: 16,
            index_restart_interval: 16,
            sequence: 1 << 20,
        }
    }

    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    pub fn restart_interval(mut self, interval: usize) -> Self {
        self.restart_interval = interval;
        self.data_block = BlockWriter::new(interval);
        self
    }

    pub fn index_restart_interval(mut self, interval: usize) -> Self {
        self.index_restart_interval = interval;
        self
    }

    /// Add a key-value pair. Keys must be added in sorted order.
    pub fn add(&mut self, key: &[u8], value: &[u8]) {
        assert!(
            self.index.is_empty() && self.data_block.is_empty() || key > self.last_key.as_slice(),
            "Keys must be added in sorted order"
        );

        let mut internal_key = key.to_vec();
        internal_key.put_u64_le((self.sequence << 8) | 1);
        self.sequence -= 1;

        self.data_block.add_data(&internal_key, value);
        self.last_key.clear();
        self.last_key.extend_from_slice(key);

        if self.data_block.current_size() >= self.block_size {
            self.flush_data_block();
        }
    }

    fn write_block(&mut self, contents: BytesMut) -> BlockHandle {
        let handle = BlockHandle::new(self.file.len() as u64, contents.len() as u64);
        self.file.put_slice(&contents);
        // Uncompressed, checksum left unset
        self.file.put_u8(0);
        self.file.put_u32_le(0);
        handle
    }

    fn flush_data_block(&mut self) {
        if self.data_block.is_empty() {
            return;
        }
        let fresh = BlockWriter::new(self.restart_interval);
        let block = std::mem::replace(&mut self.data_block, fresh);
        let handle = self.write_block(block.finish());
        self.index.push((self.last_key.clone(), handle));
    }

    /// Handles of the data blocks written so far
    pub fn data_handles(&self) -> Vec<BlockHandle> {
        self.index.iter().map(|(_, handle)| *handle).collect()
    }

    /// Finish the file and return its bytes
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_data_block();

        let metaindex = BlockWriter::new(self.restart_interval).finish();
        let metaindex_handle = self.write_block(metaindex);

        let mut index = BlockWriter::new(self.index_restart_interval);
        let mut prev = None;
        for (key, handle) in &self.index {
            index.add_index(key, *handle, prev);
            prev = Some(*handle);
        }
        let index_handle = self.write_block(index.finish());

        let footer = Footer::new(1, metaindex_handle, index_handle);
        self.file.put_slice(&footer.encode());
        self.file.to_vec()
    }
}

/// Table of `count` entries `key{:08}` -> `value{:08}`.
pub fn numbered_table(count: usize, block_size: usize) -> Vec<u8> {
    let mut writer = TableWriter::new().block_size(block_size);
    for i in 0..count {
        writer.add(format!("key{:08}", i).as_bytes(), format!("value{:08}", i).as_bytes());
    }
    writer.finish()
}
