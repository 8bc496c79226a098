//! Response definitions
//!
//! Decodes a server reply from its 12-byte header and body.
//!
//! ## Body Format
//! ```text
//! ┌───────────────┬───────────┬──────────────┬───────────┬─────┐
//! │ Status (4)    │ Count (4) │ Tuple Size(4)│ Tuple     │ ... │
//! └───────────────┴───────────┴──────────────┴───────────┴─────┘
//! ```
//! Status word: low byte = completion status, upper 24 bits = return code.
//! On a non-zero return code the rest of the body is the error message,
//! terminated by one sentinel byte.

use std::fmt;

use crate::error::{CodecError, Result};

use super::field::{Field, FieldType};
use super::request::RequestType;
use super::tuple::decode_tuple_at;
use super::varint::decode_fixed32;
use super::HEADER_SIZE;

/// Body length of a reply that carries no tuples
const STATUS_ONLY_BODY: u32 = 8;

/// A decoded packet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub request_type: u32,
    pub body_length: u32,
    pub request_id: u32,
}

impl Header {
    /// Decode `<request_type><body_length><request_id>`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(CodecError::truncated("header", HEADER_SIZE, bytes.len()));
        }

        Ok(Self {
            request_type: decode_fixed32(bytes, 0)?,
            body_length: decode_fixed32(bytes, 4)?,
            request_id: decode_fixed32(bytes, 8)?,
        })
    }

    /// Encode the header to its 12 wire bytes
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.request_type.to_le_bytes());
        out[4..8].copy_from_slice(&self.body_length.to_le_bytes());
        out[8..12].copy_from_slice(&self.request_id.to_le_bytes());
        out
    }
}

/// Completion status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// Request succeeded
    Ok,
    /// Intermittent failure; the transport may retry
    TryAgain,
    /// Hard error, see the return code
    Error,
    /// A status this codec does not know
    Unknown(u8),
}

impl CompletionStatus {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => CompletionStatus::Ok,
            1 => CompletionStatus::TryAgain,
            2 => CompletionStatus::Error,
            other => CompletionStatus::Unknown(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            CompletionStatus::Ok => 0,
            CompletionStatus::TryAgain => 1,
            CompletionStatus::Error => 2,
            CompletionStatus::Unknown(raw) => raw,
        }
    }
}

/// Split a status word into (completion status, return code)
pub fn split_status(word: u32) -> (u8, u32) {
    ((word & 0xFF) as u8, word >> 8)
}

/// A decoded server reply
///
/// Immutable once built; owns every decoded row.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    header: Header,
    completion_status: u8,
    return_code: u32,
    return_message: Option<String>,
    rowcount: Option<u32>,
    rows: Vec<Vec<Field>>,
}

impl Response {
    /// Decode a reply
    ///
    /// `field_types` casts each column; the last type repeats for extra
    /// columns. A hard server error (completion status 2) is returned as
    /// `CodecError::Database`.
    pub fn new(header: &[u8], body: &[u8], field_types: Option<&[FieldType]>) -> Result<Self> {
        let header = Header::decode(header)?;

        let mut response = Self {
            header,
            completion_status: 0,
            return_code: 0,
            return_message: None,
            rowcount: None,
            rows: Vec::new(),
        };

        if !body.is_empty() {
            response.unpack_body(body, field_types.filter(|t| !t.is_empty()))?;
        }

        Ok(response)
    }

    fn unpack_body(&mut self, body: &[u8], field_types: Option<&[FieldType]>) -> Result<()> {
        let (completion_status, return_code) = split_status(decode_fixed32(body, 0)?);
        self.completion_status = completion_status;
        self.return_code = return_code;

        if return_code != 0 {
            let end = body.len().saturating_sub(1).max(4);
            let message = String::from_utf8_lossy(&body[4..end]).into_owned();

            if CompletionStatus::from_raw(completion_status) == CompletionStatus::Error {
                tracing::warn!(code = return_code, %message, "server returned error");
                return Err(CodecError::Database {
                    code: return_code,
                    message,
                });
            }

            tracing::debug!(
                code = return_code,
                completion_status,
                %message,
                "server returned non-fatal status"
            );
            self.return_message = Some(message);
            return Ok(());
        }

        let body_length = self.header.body_length;
        if body_length == STATUS_ONLY_BODY {
            self.rowcount = Some(0);
            return Ok(());
        }

        let rowcount = decode_fixed32(body, 4)?;
        self.rowcount = Some(rowcount);

        if rowcount > 0 {
            self.unpack_rows(body, body_length as usize, field_types)?;
        }

        tracing::trace!(
            request_type = self.header.request_type,
            rowcount,
            rows = self.rows.len(),
            "decoded response"
        );
        Ok(())
    }

    /// Read `<size><tuple>` pairs until body_length is reached
    ///
    /// The stored size excludes the tuple's own 4-byte cardinality.
    fn unpack_rows(
        &mut self,
        body: &[u8],
        body_length: usize,
        field_types: Option<&[FieldType]>,
    ) -> Result<()> {
        let data = &body[..body_length.min(body.len())];
        let mut offset = 8;

        while offset < body_length {
            let tuple_size = decode_fixed32(data, offset)? as usize + 4;
            let start = offset + 4;
            let end = start + tuple_size;

            if end > body_length || end > data.len() {
                return Err(CodecError::truncated(
                    "tuple",
                    tuple_size,
                    data.len().min(body_length).saturating_sub(start),
                ));
            }

            let (fields, _) = decode_tuple_at(&data[start..end], 0)?;
            let row = match field_types {
                Some(types) => cast_row(fields, types)?,
                None => fields,
            };
            self.rows.push(row);
            offset = end;
        }

        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Request type echoed by the server
    pub fn request_type(&self) -> u32 {
        self.header.request_type
    }

    pub fn body_length(&self) -> u32 {
        self.header.body_length
    }

    pub fn request_id(&self) -> u32 {
        self.header.request_id
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Raw completion status: 0 success, 1 try again, 2 error
    pub fn completion_status(&self) -> u8 {
        self.completion_status
    }

    pub fn status(&self) -> CompletionStatus {
        CompletionStatus::from_raw(self.completion_status)
    }

    /// 0 on success, the server error code otherwise
    pub fn return_code(&self) -> u32 {
        self.return_code
    }

    /// Server message, present when the return code is non-zero
    pub fn return_message(&self) -> Option<&str> {
        self.return_message.as_deref()
    }

    /// Number of rows affected or returned
    pub fn rowcount(&self) -> Option<u32> {
        self.rowcount
    }

    pub fn rows(&self) -> &[Vec<Field>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Field>> {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<Field>> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a Response {
    type Item = &'a Vec<Field>;
    type IntoIter = std::slice::Iter<'a, Vec<Field>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn cast_row(fields: Vec<Field>, types: &[FieldType]) -> Result<Vec<Field>> {
    let last = types.len() - 1;
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| field.cast(types[i.min(last)]))
        .collect()
}

impl fmt::Display for Response {
    /// SELECT replies and replies with rows render as a row list; other
    /// replies render as "N record(s) <verb>".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request_type = RequestType::from_code(self.header.request_type);

        if request_type == Some(RequestType::Select) || !self.rows.is_empty() {
            f.write_str("[")?;
            for (i, row) in self.rows.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str("(")?;
                for (j, field) in row.iter().enumerate() {
                    if j > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", field)?;
                }
                f.write_str(")")?;
            }
            return f.write_str("]");
        }

        let verb = match request_type {
            Some(RequestType::Insert) => "inserted",
            Some(RequestType::Delete) => "deleted",
            Some(RequestType::Update) => "updated",
            _ => "affected",
        };
        let count = self.rowcount.unwrap_or(0);
        let plural = if count == 1 { "" } else { "s" };
        write!(f, "{} record{} {}", count, plural, verb)
    }
}

/// Decode a reply (see [`Response::new`])
pub fn decode_response(
    header: &[u8],
    body: &[u8],
    field_types: Option<&[FieldType]>,
) -> Result<Response> {
    Response::new(header, body, field_types)
}
