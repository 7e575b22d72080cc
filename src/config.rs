//! Format constants and read options for SstLookup.
//!
//! The constants describe the fixed parts of the block-based table layout
//! (format version 5). They never change at runtime.

/// Magic number stored little-endian in the last 8 bytes of every table file.
pub const MAGIC_NUMBER: u64 = 0x88E2_41B7_85F4_CFF7;

/// The only table format version this crate decodes.
pub const FORMAT_VERSION: u32 = 5;

/// Size of the file footer in bytes.
///
/// ```text
/// [checksum_type: 1][handles: 40][version: 4][magic: 8]
/// ```
pub const FOOTER_SIZE: usize = 53;

/// Size of the varint region of the footer holding the two block handles.
/// Bytes not consumed by the handles are padding.
pub const FOOTER_HANDLES_SIZE: usize = 40;

/// Size of the trailer following every block: 1 byte type + 4 byte checksum.
/// Not counted in a block handle's size.
pub const BLOCK_TRAILER_SIZE: usize = 5;

/// Size of the block footer holding the restart count.
pub const BLOCK_FOOTER_SIZE: usize = 4;

/// Mask selecting the restart count from the block footer. The top bit is
/// reserved for the data block index type.
pub const NUM_RESTARTS_MASK: u32 = (1 << 31) - 1;

/// Size of the sequence number + value type suffix on every data block key.
pub const INTERNAL_KEY_FOOTER_SIZE: usize = 8;

/// Bits of payload carried by each varint byte.
pub const VARINT_SHIFT: u32 = 7;

/// Continuation bit of a varint byte.
pub const VARINT_MSB: u8 = 1 << VARINT_SHIFT;

/// Maximum encoded length of a 32-bit varint.
pub const MAX_VARINT32_LEN: usize = 5;

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT64_LEN: usize = 10;

/// Checksum algorithm named by the first footer byte.
///
/// Decoded for diagnostics only; block checksums are never verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChecksumType {
    /// No checksum.
    NoChecksum = 0,
    /// CRC32C.
    Crc32c = 1,
    /// xxHash (32-bit).
    XxHash = 2,
    /// xxHash64.
    XxHash64 = 3,
    /// XXH3.
    Xxh3 = 4,
}

impl ChecksumType {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ChecksumType::NoChecksum),
            1 => Some(ChecksumType::Crc32c),
            2 => Some(ChecksumType::XxHash),
            3 => Some(ChecksumType::XxHash64),
            4 => Some(ChecksumType::Xxh3),
            _ => None,
        }
    }
}

/// Compression type named by the first byte of a block trailer.
///
/// Blocks are always scanned as stored; compressed blocks are not inflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionType {
    /// Uncompressed.
    None = 0,
    /// Snappy.
    Snappy = 1,
    /// Zlib.
    Zlib = 2,
    /// BZip2.
    BZip2 = 3,
    /// LZ4.
    Lz4 = 4,
    /// LZ4HC.
    Lz4hc = 5,
    /// Xpress.
    Xpress = 6,
    /// Zstandard.
    Zstd = 7,
}

impl CompressionType {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Snappy),
            2 => Some(CompressionType::Zlib),
            3 => Some(CompressionType::BZip2),
            4 => Some(CompressionType::Lz4),
            5 => Some(CompressionType::Lz4hc),
            6 => Some(CompressionType::Xpress),
            7 => Some(CompressionType::Zstd),
            _ => None,
        }
    }
}

/// How a block is searched for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekMode {
    /// Scan every entry from the start of the block.
    #[default]
    Linear,

    /// Binary search the restart array for the last restart whose key is
    /// below the search key, then scan forward from there. Relies on every
    /// restart entry storing its key (and, in index blocks, its handle) in
    /// full.
    RestartBinarySearch,
}

/// Options controlling a lookup.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Block search strategy.
    /// Default: SeekMode::Linear
    pub seek_mode: SeekMode,
}

impl ReadOptions {
    /// Creates a new ReadOptions with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the block search strategy.
    pub fn seek_mode(mut self, mode: SeekMode) -> Self {
        self.seek_mode = mode;
        self
    }
}
