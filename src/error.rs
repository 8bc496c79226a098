//! Error types for the Tarantool codec
//!
//! Provides a unified error type for encoding requests and decoding responses.

use thiserror::Error;

/// Result type alias using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;

/// Unified error type for codec operations
#[derive(Debug, Error)]
pub enum CodecError {
    // -------------------------------------------------------------------------
    // Encode Errors
    // -------------------------------------------------------------------------
    #[error("Value {value} does not fit the encodable range (max {max})")]
    EncodeOverflow { value: i128, max: u64 },

    #[error("Unsupported field type {0}: only integer, string or bytes expected")]
    UnsupportedType(&'static str),

    #[error("Unsupported key type {0}: key must be an integer, string, bytes or array")]
    InvalidKeyType(&'static str),

    #[error("Invalid update operation: {0}")]
    InvalidOperation(String),

    #[error("Empty tuple: {0} requires at least one field")]
    EmptyTuple(&'static str),

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    #[error("Truncated response while reading {context}: need {needed} bytes, {available} available")]
    TruncatedResponse {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Invalid varint at offset {offset}: continuation bit set on byte 5")]
    InvalidVarint { offset: usize },

    #[error("Cast error: {0}")]
    Cast(String),

    // -------------------------------------------------------------------------
    // Server Errors
    // -------------------------------------------------------------------------
    #[error("Database error {code}: {message}")]
    Database { code: u32, message: String },

    // -------------------------------------------------------------------------
    // Stream Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Response body too large: {size} bytes (max {max})")]
    BodyTooLarge { size: u32, max: u32 },
}

impl CodecError {
    /// Whether this is an error reported by the server
    pub fn is_database(&self) -> bool {
        matches!(self, CodecError::Database { .. })
    }

    /// Server return code for database errors
    pub fn return_code(&self) -> Option<u32> {
        match self {
            CodecError::Database { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn truncated(context: &'static str, needed: usize, available: usize) -> Self {
        CodecError::TruncatedResponse {
            context,
            needed,
            available,
        }
    }
}
