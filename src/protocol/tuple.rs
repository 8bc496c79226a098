//! Tuple codec
//!
//! ```text
//! ┌─────────────────┬───────────────┬─────────┬─────┐
//! │ Cardinality (4) │ Field Len (v) │ Payload │ ... │
//! └─────────────────┴───────────────┴─────────┴─────┘
//! ```
//! Cardinality is little-endian and always equals the number of fields.

use bytes::BufMut;

use crate::error::{CodecError, Result};

use super::field::Field;
use super::varint::{decode_fixed32, decode_varint, put_varint, varint_len};

/// Append `<varint len><payload>` for a single field
pub fn put_field<B: BufMut>(buf: &mut B, field: &Field) -> Result<()> {
    put_varint(buf, field.payload_len() as u64)?;
    buf.put_slice(&field.as_bytes());
    Ok(())
}

/// Encode a single field with its length prefix
pub fn encode_field(field: &Field) -> Result<Vec<u8>> {
    let len = field.payload_len();
    let mut buf = Vec::with_capacity(varint_len(len as u64)? + len);
    put_field(&mut buf, field)?;
    Ok(buf)
}

/// Append a tuple: cardinality followed by each field, in input order
pub fn put_tuple<B: BufMut>(buf: &mut B, fields: &[Field]) -> Result<()> {
    let cardinality = u32::try_from(fields.len()).map_err(|_| CodecError::EncodeOverflow {
        value: fields.len() as i128,
        max: u64::from(u32::MAX),
    })?;

    buf.put_u32_le(cardinality);
    for field in fields {
        put_field(buf, field)?;
    }
    Ok(())
}

/// Encode a tuple to bytes
pub fn encode_tuple(fields: &[Field]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(4 + fields.iter().map(|f| 1 + f.payload_len()).sum::<usize>());
    put_tuple(&mut buf, fields)?;
    Ok(buf)
}

/// Decode a tuple at the start of `buf`
///
/// Every decoded field is raw bytes; use [`Field::cast`] or the typed
/// accessors to interpret them.
pub fn decode_tuple(buf: &[u8]) -> Result<Vec<Field>> {
    decode_tuple_at(buf, 0).map(|(fields, _)| fields)
}

/// Decode a tuple starting at `offset`
///
/// Returns the fields and the offset just past the last field.
pub fn decode_tuple_at(buf: &[u8], offset: usize) -> Result<(Vec<Field>, usize)> {
    let cardinality = decode_fixed32(buf, offset)? as usize;
    let mut offset = offset + 4;

    // Every field occupies at least one byte
    let mut fields = Vec::with_capacity(cardinality.min(buf.len().saturating_sub(offset)));

    for _ in 0..cardinality {
        let (size, next) = decode_varint(buf, offset)?;
        let size = size as usize;
        let end = next + size;

        let payload = buf
            .get(next..end)
            .ok_or_else(|| CodecError::truncated("field", size, buf.len().saturating_sub(next)))?;

        fields.push(Field::Bytes(payload.to_vec()));
        offset = end;
    }

    Ok((fields, offset))
}
