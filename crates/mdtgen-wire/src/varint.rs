//! Base-128 varints and zig-zag mapping
//!
//! Varints are little-endian groups of 7 bits with the high bit set on every
//! byte except the last. Signed values are zig-zag mapped first so that small
//! magnitudes of either sign stay short.

use crate::error::{Result, WireError};

/// Maximum encoded length of a 64-bit varint
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` as a varint
pub fn put_varint(buffer: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buffer.push(byte);
            break;
        } else {
            buffer.push(byte | 0x80);
        }
    }
}

/// Number of bytes `value` occupies as a varint
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Read a varint starting at `*pos`, advancing `pos` past it.
pub fn read_varint(data: &[u8], pos: &mut usize) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0;

    loop {
        if *pos >= data.len() {
            return Err(WireError::BufferUnderflow);
        }

        let byte = data[*pos];
        *pos += 1;

        value |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            break;
        }

        shift += 7;
        if shift >= 64 {
            return Err(WireError::VarintOverflow);
        }
    }

    Ok(value)
}

/// Zigzag encode a 32-bit signed integer
/// Maps: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...
#[inline]
pub fn zigzag_encode32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Zigzag encode a 64-bit signed integer
#[inline]
pub fn zigzag_encode64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Zigzag decode to a 32-bit signed integer
#[inline]
pub fn zigzag_decode32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ (-((value & 1) as i32))
}

/// Zigzag decode to a 64-bit signed integer
#[inline]
pub fn zigzag_decode64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ (-((value & 1) as i64))
}
