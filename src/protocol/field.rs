//! Field definitions
//!
//! A field is a single scalar element of a tuple. On the wire every field is
//! `<varint byte_len><raw bytes>`; integers travel in their fixed-width
//! little-endian form, never as decimal text.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CodecError, Result};

/// Largest integer stored in the 4-byte form
const FIELD_U32_MAX: u64 = 0xFFFF_FFFF;

/// A single scalar value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Field {
    /// Unsigned integer, 4 bytes on the wire up to 2^32-1, 8 bytes above
    Integer(u64),

    /// Raw bytes, sent as-is
    Bytes(Vec<u8>),

    /// UTF-8 text, sent as its bytes
    Text(String),
}

impl Field {
    /// Build a text field from possibly-invalid UTF-8, replacing bad sequences
    pub fn text_lossy(bytes: &[u8]) -> Self {
        Field::Text(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Raw payload bytes as they appear on the wire (without length prefix)
    pub fn as_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Field::Integer(v) if *v <= FIELD_U32_MAX => {
                Cow::Owned((*v as u32).to_le_bytes().to_vec())
            }
            Field::Integer(v) => Cow::Owned(v.to_le_bytes().to_vec()),
            Field::Bytes(b) => Cow::Borrowed(b),
            Field::Text(s) => Cow::Borrowed(s.as_bytes()),
        }
    }

    /// Length of the payload in bytes
    pub fn payload_len(&self) -> usize {
        match self {
            Field::Integer(v) if *v <= FIELD_U32_MAX => 4,
            Field::Integer(_) => 8,
            Field::Bytes(b) => b.len(),
            Field::Text(s) => s.len(),
        }
    }

    /// Interpret the field as an integer
    ///
    /// Byte payloads must be exactly 4 or 8 bytes long.
    pub fn as_integer(&self) -> Result<u64> {
        let raw = match self {
            Field::Integer(v) => return Ok(*v),
            Field::Bytes(b) => b.as_slice(),
            Field::Text(s) => s.as_bytes(),
        };

        match raw.len() {
            4 => Ok(u64::from(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))),
            8 => {
                let mut word = [0u8; 8];
                word.copy_from_slice(raw);
                Ok(u64::from_le_bytes(word))
            }
            len => Err(CodecError::Cast(format!(
                "unable to cast field to integer: length must be 4 or 8 bytes, field length is {}",
                len
            ))),
        }
    }

    /// Interpret the field as text (lossy UTF-8)
    ///
    /// Integers render as decimal.
    pub fn as_text(&self) -> String {
        match self {
            Field::Integer(v) => v.to_string(),
            Field::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Field::Text(s) => s.clone(),
        }
    }

    /// Convert to the requested column type
    pub fn cast(&self, to: FieldType) -> Result<Field> {
        match to {
            FieldType::Raw => Ok(self.clone()),
            FieldType::Text => Ok(Field::Text(self.as_text())),
            FieldType::Integer => self.as_integer().map(Field::Integer),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Integer(v) => write!(f, "{}", v),
            Field::Text(s) => write!(f, "{:?}", s),
            Field::Bytes(b) => {
                f.write_str("b\"")?;
                for byte in b {
                    write!(f, "{}", std::ascii::escape_default(*byte))?;
                }
                f.write_str("\"")
            }
        }
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Field {
                fn from(value: $t) -> Self {
                    Field::Integer(value as u64)
                }
            }
        )*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Text(value)
    }
}

impl From<&[u8]> for Field {
    fn from(value: &[u8]) -> Self {
        Field::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Field {
    fn from(value: &[u8; N]) -> Self {
        Field::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Field {
    fn from(value: Vec<u8>) -> Self {
        Field::Bytes(value)
    }
}

// =============================================================================
// Column types
// =============================================================================

/// Target type for casting decoded fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Leave the field as raw bytes
    Raw,
    /// Lossy UTF-8 text
    Text,
    /// 4 or 8 byte little-endian integer
    Integer,
}

impl FromStr for FieldType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raw" | "bytes" | "any" => Ok(FieldType::Raw),
            "text" | "str" | "string" => Ok(FieldType::Text),
            "integer" | "int" => Ok(FieldType::Integer),
            other => Err(CodecError::Cast(format!("invalid field type {}", other))),
        }
    }
}

// =============================================================================
// Dynamic values
// =============================================================================

/// A loosely-typed value as held by callers (e.g. parsed from JSON)
///
/// Conversion into [`Field`] is the point where unsupported shapes are
/// rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
}

impl Value {
    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
        }
    }

    /// Whether the value converts to a single field
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::UInt(_) | Value::Str(_) | Value::Bytes(_)
        )
    }
}

impl TryFrom<Value> for Field {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::UInt(v) => Ok(Field::Integer(v)),
            Value::Int(v) if v >= 0 => Ok(Field::Integer(v as u64)),
            Value::Int(v) => Err(CodecError::EncodeOverflow {
                value: i128::from(v),
                max: u64::MAX,
            }),
            Value::Str(s) => Ok(Field::Text(s)),
            Value::Bytes(b) => Ok(Field::Bytes(b)),
            other => Err(CodecError::UnsupportedType(other.type_name())),
        }
    }
}

impl From<Field> for Value {
    fn from(field: Field) -> Self {
        match field {
            Field::Integer(v) => Value::UInt(v),
            Field::Bytes(b) => Value::Bytes(b),
            Field::Text(s) => Value::Str(s),
        }
    }
}
