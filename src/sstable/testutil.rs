//! Block encoders used by the unit tests.

use crate::coding::{put_varint32, put_varsignedint64};
use crate::sstable::footer::BlockHandle;
use bytes::BufMut;

/// Append restart array, block footer and an uncompressed trailer.
pub(crate) fn finish_block(mut entries: Vec<u8>, restarts: &[u32]) -> Vec<u8> {
    for restart in restarts {
        entries.put_u32_le(*restart);
    }
    entries.put_u32_le(restarts.len() as u32);
    entries.put_u8(0);
    entries.put_u32_le(0);
    entries
}

pub(crate) fn shared_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Stored data block key: user key followed by `(sequence << 8) | type`.
pub(crate) fn internal_key(user_key: &[u8], sequence: u64, value_type: u8) -> Vec<u8> {
    let mut key = user_key.to_vec();
    key.put_u64_le((sequence << 8) | u64::from(value_type));
    key
}

/// Index block with delta-encoded handles for non-restart entries.
pub(crate) fn index_block(entries: &[(&[u8], BlockHandle)], restart_interval: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut restarts = Vec::new();
    let mut last_key: &[u8] = &[];
    let mut last_handle: Option<BlockHandle> = None;

    for (i, (key, handle)) in entries.iter().enumerate() {
        let shared = if i % restart_interval == 0 {
            restarts.push(buf.len() as u32);
            0
        } else {
            shared_prefix_len(last_key, key)
        };

        put_varint32(&mut buf, shared as u32);
        put_varint32(&mut buf, (key.len() - shared) as u32);
        buf.put_slice(&key[shared..]);

        match last_handle {
            Some(prev) if shared > 0 => {
                put_varsignedint64(&mut buf, handle.size as i64 - prev.size as i64);
            }
            _ => handle.encode_to(&mut buf),
        }

        last_key = *key;
        last_handle = Some(*handle);
    }

    if restarts.is_empty() {
        restarts.push(0);
    }
    finish_block(buf, &restarts)
}

/// Data block of `(user_key, value)` pairs with sequence numbers counting
/// down from 100.
pub(crate) fn data_block(entries: &[(&[u8], &[u8])], restart_interval: usize) -> Vec<u8> {
    let keys: Vec<Vec<u8>> = entries
        .iter()
        .enumerate()
        .map(|(i, (key, _))| internal_key(key, 100 - i as u64, 1))
        .collect();
    let values: Vec<&[u8]> = entries.iter().map(|(_, value)| *value).collect();
    data_block_raw(&keys, &values, restart_interval)
}

/// Data block over already-encoded internal keys.
pub(crate) fn data_block_raw(
    keys: &[Vec<u8>],
    values: &[&[u8]],
    restart_interval: usize,
) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut restarts = Vec::new();
    let mut last_key: &[u8] = &[];

    for (i, (key, value)) in keys.iter().zip(values).enumerate() {
        let shared = if i % restart_interval == 0 {
            restarts.push(buf.len() as u32);
            0
        } else {
            shared_prefix_len(last_key, key)
        };

        put_varint32(&mut buf, shared as u32);
        put_varint32(&mut buf, (key.len() - shared) as u32);
        put_varint32(&mut buf, value.len() as u32);
        buf.put_slice(&key[shared..]);
        buf.put_slice(value);

        last_key = key.as_slice();
    }

    if restarts.is_empty() {
        restarts.push(0);
    }
    finish_block(buf, &restarts)
}
