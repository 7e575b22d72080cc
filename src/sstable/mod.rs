//! Block-based table decoding.
//!
//! A table file is an immutable, sorted key-value file. Lookups read it
//! back to front: the footer locates the index block, the index block
//! locates the data block, the data block holds the value.
//!
//! ## File Format
//!
//! ```text
//! [Data Block 1][trailer]
//! [Data Block 2][trailer]
//! ...
//! [Data Block N][trailer]
//! [Meta Blocks...]
//! [Metaindex Block][trailer]
//! [Index Block][trailer]
//! [Footer: 53B]
//! ```
//!
//! ## Block Format
//!
//! Each block contains:
//! - Prefix-compressed entries
//! - A restart array of u32 offsets where a key is stored in full
//! - A u32 footer whose low 31 bits count the restarts
//! - A 5-byte trailer (compression type + checksum) outside the handle size
//!
//! ## Index Format
//!
//! The index block maps separator keys to data block handles, delta
//! encoded between neighbouring entries.

pub mod block;
pub mod data;
pub mod footer;
pub mod index;
pub mod reader;

#[cfg(test)]
pub(crate) mod testutil;

pub use block::{Block, BlockTrailer};
pub use data::{DataBlock, DataBlockIterator, ValueType};
pub use footer::{BlockHandle, Footer};
pub use index::{IndexBlock, IndexIterator};
pub use reader::{read_table_file, LookupTrace, TableReader};
