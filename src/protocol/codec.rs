//! Stream helpers
//!
//! Glue between the codec and any `Read`/`Write` transport. These helpers
//! add no framing of their own: a request is written as its exact bytes and
//! a response is read as a 12-byte header followed by `body_length` bytes.

use std::io::{Read, Write};

use crate::config::Config;
use crate::error::{CodecError, Result};

use super::request::Request;
use super::response::{Header, Response};
use super::HEADER_SIZE;

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = request.encode()?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a response header from a stream
///
/// Blocks until all 12 bytes are received or an error occurs.
pub fn read_header<R: Read>(reader: &mut R) -> Result<([u8; HEADER_SIZE], Header)> {
    let mut raw = [0u8; HEADER_SIZE];
    reader.read_exact(&mut raw)?;
    let header = Header::decode(&raw)?;
    Ok((raw, header))
}

/// Read and decode a complete response from a stream
///
/// Rows are cast with `config.field_types` when set.
pub fn read_response<R: Read>(reader: &mut R, config: &Config) -> Result<Response> {
    let (raw_header, header) = read_header(reader)?;

    // Validate body length
    if header.body_length > config.max_body_size {
        return Err(CodecError::BodyTooLarge {
            size: header.body_length,
            max: config.max_body_size,
        });
    }

    let mut body = vec![0u8; header.body_length as usize];
    if !body.is_empty() {
        reader.read_exact(&mut body)?;
    }

    tracing::trace!(
        request_type = header.request_type,
        body_length = header.body_length,
        request_id = header.request_id,
        "read response"
    );

    Response::new(&raw_header, &body, config.field_types())
}
