//! Variable-length integer coding.
//!
//! Varints store an unsigned integer 7 bits per byte, least significant
//! group first, with the high bit of each byte set while more bytes follow.
//! Signed values are zigzag mapped onto unsigned ones first so that small
//! magnitudes of either sign stay short.
//!
//! Decoders read from the start of the given slice and return the decoded
//! value together with the number of bytes consumed.

use crate::config::{MAX_VARINT32_LEN, MAX_VARINT64_LEN, VARINT_MSB, VARINT_SHIFT};
use crate::error::{Error, Result};
use bytes::BufMut;

fn decode_varint(data: &[u8], max_len: usize, bits: u32) -> Result<(u64, usize)> {
    let mut value = 0u64;

    for i in 0..max_len {
        let byte = *data.get(i).ok_or_else(|| {
            Error::format(format!("varint truncated: buffer ends after {} bytes", data.len()))
        })?;

        let shift = i as u32 * VARINT_SHIFT;
        let payload = u64::from(byte & !VARINT_MSB);

        // The final group may only fill the bits left below the width.
        let room = bits - shift;
        if room < VARINT_SHIFT && payload >> room != 0 {
            return Err(Error::format(format!("varint overflows {} bits", bits)));
        }

        value |= payload << shift;

        if byte & VARINT_MSB == 0 {
            return Ok((value, i + 1));
        }
    }

    Err(Error::format(format!("varint too long: no terminator within {} bytes", max_len)))
}

/// Decode a 32-bit varint. Consumes at most 5 bytes.
pub fn decode_varint32(data: &[u8]) -> Result<(u32, usize)> {
    let (value, len) = decode_varint(data, MAX_VARINT32_LEN, 32)?;
    Ok((value as u32, len))
}

/// Decode a 64-bit varint. Consumes at most 10 bytes.
pub fn decode_varint64(data: &[u8]) -> Result<(u64, usize)> {
    decode_varint(data, MAX_VARINT64_LEN, 64)
}

/// Decode a zigzag encoded signed 64-bit varint.
pub fn decode_varsignedint64(data: &[u8]) -> Result<(i64, usize)> {
    let (raw, len) = decode_varint64(data)?;
    Ok((zigzag_decode(raw), len))
}

/// Map a zigzag encoded value back to its signed form.
#[inline]
pub fn zigzag_decode(raw: u64) -> i64 {
    ((raw >> 1) as i64) ^ -((raw & 1) as i64)
}

/// Map a signed value onto the unsigned zigzag space.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Append a 32-bit varint.
pub fn put_varint32<B: BufMut>(dst: &mut B, value: u32) {
    put_varint64(dst, u64::from(value));
}

/// Append a 64-bit varint.
pub fn put_varint64<B: BufMut>(dst: &mut B, mut value: u64) {
    while value >= u64::from(VARINT_MSB) {
        dst.put_u8((value as u8) | VARINT_MSB);
        value >>= VARINT_SHIFT;
    }
    dst.put_u8(value as u8);
}

/// Append a zigzag encoded signed 64-bit varint.
pub fn put_varsignedint64<B: BufMut>(dst: &mut B, value: i64) {
    put_varint64(dst, zigzag_encode(value));
}

/// Number of bytes `put_varint64` writes for `value`.
pub fn varint_length(mut value: u64) -> usize {
    let mut len = 1;
    while value >= u64::from(VARINT_MSB) {
        value >>= VARINT_SHIFT;
        len += 1;
    }
    len
}
