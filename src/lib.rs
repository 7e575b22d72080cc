//! # SstLookup - Point Lookups in Block-Based Table Files
//!
//! SstLookup answers "what value does this key map to?" against a single
//! immutable table file written by a RocksDB-style LSM-tree engine
//! (format version 5), without materialising the file's contents.
//!
//! ## Architecture
//!
//! The decoding pipeline is strictly linear:
//!
//! - **Coding**: varint and zigzag primitives
//! - **Footer**: validates magic and version, yields the index block handle
//! - **Index Block**: delta-decodes handles to pick the data block
//! - **Data Block**: prefix-decodes keys to find an exact match
//! - **Reader**: composes the above over one in-memory buffer
//!
//! Lookups never mutate anything, so one buffer can serve concurrent
//! lookups from many threads.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sstlookup::sstable::read_table_file;
//!
//! # fn main() -> Result<(), sstlookup::Error> {
//! let file = read_table_file("./000042.sst")?;
//!
//! match sstlookup::lookup(&file, b"key1")? {
//!     Some(value) => println!("Found: {:?}", value),
//!     None => println!("Not found"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod coding;
pub mod config;
pub mod error;
pub mod sstable;

// Re-exports
pub use config::{ReadOptions, SeekMode};
pub use error::{Error, Result};
pub use sstable::{BlockHandle, Footer, LookupTrace, TableReader};

/// Look up `key` in a complete table file.
///
/// Returns the stored value, or `None` if the file holds no entry for
/// `key`. Any structural problem with the file is an `Error::Format`.
pub fn lookup<'a>(file: &'a [u8], key: &[u8]) -> Result<Option<&'a [u8]>> {
    TableReader::new(file)?.get(key)
}
