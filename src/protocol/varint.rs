//! Primitive codec
//!
//! Variable-length integers (used only as field length prefixes) and
//! fixed-width little-endian integers.
//!
//! ## Varint Format
//! ```text
//! value = 300 = 0b10_0101100
//! ┌──────────────┬──────────────┐
//! │ 1 | 0000010  │ 0 | 0101100  │
//! └──────────────┴──────────────┘
//!   high group      low group (no continuation bit)
//! ```
//! Groups are written most-significant first, at most 5 bytes (35 bits).

use std::sync::OnceLock;

use bytes::BufMut;

use crate::error::{CodecError, Result};

/// Maximum number of bytes in an encoded varint
pub const VARINT_MAX_BYTES: usize = 5;

/// Largest value representable as a varint (2^35 - 1)
pub const VARINT_MAX_VALUE: u64 = (1 << 35) - 1;

/// Values below this bound are served from the precomputed table
const SMALL_LIMIT: u64 = 1 << 14;

const CONTINUATION: u8 = 0x80;

/// Precomputed encodings for 0..16384: (bytes, len)
static SMALL_VARINTS: OnceLock<Box<[([u8; 2], u8)]>> = OnceLock::new();

fn small_varints() -> &'static [([u8; 2], u8)] {
    SMALL_VARINTS.get_or_init(|| {
        (0..SMALL_LIMIT)
            .map(|v| {
                if v < 0x80 {
                    ([v as u8, 0], 1)
                } else {
                    ([(v >> 7) as u8 | CONTINUATION, (v & 0x7F) as u8], 2)
                }
            })
            .collect()
    })
}

/// Number of bytes needed to encode `value`
pub fn varint_len(value: u64) -> Result<usize> {
    match value {
        v if v < 1 << 7 => Ok(1),
        v if v < 1 << 14 => Ok(2),
        v if v < 1 << 21 => Ok(3),
        v if v < 1 << 28 => Ok(4),
        v if v <= VARINT_MAX_VALUE => Ok(5),
        v => Err(CodecError::EncodeOverflow {
            value: v as i128,
            max: VARINT_MAX_VALUE,
        }),
    }
}

/// Append the varint encoding of `value` to `buf`
pub fn put_varint<B: BufMut>(buf: &mut B, value: u64) -> Result<()> {
    if value < SMALL_LIMIT {
        let (bytes, len) = small_varints()[value as usize];
        buf.put_slice(&bytes[..len as usize]);
        return Ok(());
    }

    let len = varint_len(value)?;
    for group in (1..len).rev() {
        buf.put_u8((value >> (7 * group)) as u8 & 0x7F | CONTINUATION);
    }
    buf.put_u8(value as u8 & 0x7F);
    Ok(())
}

/// Encode a varint
///
/// Fails with `EncodeOverflow` for values that need more than 35 bits.
pub fn encode_varint(value: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(VARINT_MAX_BYTES);
    put_varint(&mut buf, value)?;
    Ok(buf)
}

/// Decode a varint starting at `offset`
///
/// Returns the value and the offset just past the consumed bytes.
pub fn decode_varint(bytes: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;

    for i in 0..VARINT_MAX_BYTES {
        let pos = offset + i;
        let byte = *bytes
            .get(pos)
            .ok_or_else(|| CodecError::truncated("varint", pos + 1 - offset, bytes.len().saturating_sub(offset)))?;

        value = (value << 7) | u64::from(byte & 0x7F);
        if byte & CONTINUATION == 0 {
            return Ok((value, pos + 1));
        }
    }

    Err(CodecError::InvalidVarint { offset })
}

// =============================================================================
// Fixed-width integers
// =============================================================================

/// Encode a u32 as 4 little-endian bytes
pub fn encode_fixed32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Encode a u64 as 8 little-endian bytes
pub fn encode_fixed64(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// Decode a little-endian u32 at `offset`
pub fn decode_fixed32(bytes: &[u8], offset: usize) -> Result<u32> {
    let raw = bytes
        .get(offset..offset + 4)
        .ok_or_else(|| CodecError::truncated("fixed32", 4, bytes.len().saturating_sub(offset)))?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Decode a little-endian u64 at `offset`
pub fn decode_fixed64(bytes: &[u8], offset: usize) -> Result<u64> {
    let raw = bytes
        .get(offset..offset + 8)
        .ok_or_else(|| CodecError::truncated("fixed64", 8, bytes.len().saturating_sub(offset)))?;
    let mut word = [0u8; 8];
    word.copy_from_slice(raw);
    Ok(u64::from_le_bytes(word))
}
