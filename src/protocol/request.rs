//! Request definitions
//!
//! Each request is encoded as the common 12-byte header followed by a body
//! whose layout depends on the request type. Encoding is pure: the same
//! request always produces the same bytes.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};

use crate::config::{Config, DEFAULT_SELECT_LIMIT};
use crate::error::{CodecError, Result};

use super::field::{Field, Value};
use super::tuple::{put_field, put_tuple};
use super::HEADER_SIZE;

/// Body flag asking the server to return the affected tuple
pub const FLAG_RETURN_TUPLE: u32 = 0x01;

/// Request type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RequestType {
    Insert = 13,
    Select = 17,
    Update = 19,
    Delete = 21,
    Call = 22,
    Ping = 0xFF00,
}

impl RequestType {
    /// Wire value of the tag
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Look up a tag by its wire value
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            13 => Some(RequestType::Insert),
            17 => Some(RequestType::Select),
            19 => Some(RequestType::Update),
            21 => Some(RequestType::Delete),
            22 => Some(RequestType::Call),
            0xFF00 => Some(RequestType::Ping),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::Insert => "insert",
            RequestType::Select => "select",
            RequestType::Update => "update",
            RequestType::Delete => "delete",
            RequestType::Call => "call",
            RequestType::Ping => "ping",
        }
    }
}

fn flags(return_tuple: bool) -> u32 {
    if return_tuple {
        FLAG_RETURN_TUPLE
    } else {
        0
    }
}

// =============================================================================
// Keys
// =============================================================================

/// A key: one or more fields looked up in an index
///
/// A bare scalar becomes a single-element key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(Vec<Field>);

impl Key {
    pub fn new(fields: Vec<Field>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &[Field] {
        &self.0
    }
}

impl From<Field> for Key {
    fn from(field: Field) -> Self {
        Key(vec![field])
    }
}

impl From<Vec<Field>> for Key {
    fn from(fields: Vec<Field>) -> Self {
        Key(fields)
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key(vec![Field::from(value)])
    }
}

impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Key(vec![Field::from(value)])
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key(vec![Field::from(value)])
    }
}

impl TryFrom<Value> for Key {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(Field::try_from)
                .collect::<Result<Vec<_>>>()
                .map(Key),
            v if v.is_scalar() => Field::try_from(v).map(Key::from),
            other => Err(CodecError::InvalidKeyType(other.type_name())),
        }
    }
}

// =============================================================================
// Update operations
// =============================================================================

/// Update operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UpdateOpCode {
    Assign = 0,
    Add = 1,
    And = 2,
    Xor = 3,
    Or = 4,
    Splice = 5,
}

impl UpdateOpCode {
    pub const ALL: [UpdateOpCode; 6] = [
        UpdateOpCode::Assign,
        UpdateOpCode::Add,
        UpdateOpCode::And,
        UpdateOpCode::Xor,
        UpdateOpCode::Or,
        UpdateOpCode::Splice,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Symbol used to name the operation
    pub fn symbol(self) -> &'static str {
        match self {
            UpdateOpCode::Assign => "=",
            UpdateOpCode::Add => "+",
            UpdateOpCode::And => "&",
            UpdateOpCode::Xor => "^",
            UpdateOpCode::Or => "|",
            UpdateOpCode::Splice => "splice",
        }
    }
}

impl FromStr for UpdateOpCode {
    type Err = CodecError;

    fn from_str(symbol: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|op| op.symbol()).collect();
                CodecError::InvalidOperation(format!(
                    "invalid operation symbol {}, expected one of {}",
                    symbol,
                    valid.join(", ")
                ))
            })
    }
}

impl fmt::Display for UpdateOpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single update operation: `<field_no u32><op_code u8><argument field>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOperation {
    pub field_no: u32,
    pub op: UpdateOpCode,
    pub argument: Field,
}

impl UpdateOperation {
    /// Build an operation from its symbol (`=`, `+`, `&`, `^`, `|`, `splice`)
    pub fn new(field_no: u32, symbol: &str, argument: impl Into<Field>) -> Result<Self> {
        Ok(Self {
            field_no,
            op: symbol.parse()?,
            argument: argument.into(),
        })
    }
}

impl TryFrom<Value> for UpdateOperation {
    type Error = CodecError;

    /// Accepts a 3-element array `[field_no, symbol, argument]`
    fn try_from(value: Value) -> Result<Self> {
        let arity_error = || {
            CodecError::InvalidOperation(
                "operation must be an array of 3 elements (field_no, op, value)".to_string(),
            )
        };

        let items = match value {
            Value::Array(items) if items.len() == 3 => items,
            _ => return Err(arity_error()),
        };

        let mut items = items.into_iter();
        let (field_no, symbol, argument) = match (items.next(), items.next(), items.next()) {
            (Some(f), Some(s), Some(a)) => (f, s, a),
            _ => return Err(arity_error()),
        };

        let field_no = match field_no {
            Value::UInt(v) => u32::try_from(v).ok(),
            Value::Int(v) => u32::try_from(v).ok(),
            _ => None,
        }
        .ok_or_else(|| {
            CodecError::InvalidOperation("field number must be an integer in u32 range".to_string())
        })?;

        let symbol = match symbol {
            Value::Str(s) => s,
            other => {
                return Err(CodecError::InvalidOperation(format!(
                    "operation symbol must be a string, got {}",
                    other.type_name()
                )))
            }
        };

        Ok(Self {
            field_no,
            op: symbol.parse()?,
            argument: Field::try_from(argument)?,
        })
    }
}

// =============================================================================
// Request bodies
// =============================================================================

/// A request body with a fixed type tag
pub trait RequestBody {
    /// Type tag written in the header
    fn request_type(&self) -> RequestType;

    /// Append the type-specific body
    fn encode_body(&self, buf: &mut BytesMut) -> Result<()>;

    /// Encode header and body
    ///
    /// The body is assembled first so that body_length is exact.
    fn encode(&self) -> Result<Vec<u8>> {
        let mut body = BytesMut::new();
        self.encode_body(&mut body)?;

        let body_length = u32::try_from(body.len()).map_err(|_| CodecError::EncodeOverflow {
            value: body.len() as i128,
            max: u64::from(u32::MAX),
        })?;

        let request_type = self.request_type();
        tracing::trace!(
            request_type = request_type.as_str(),
            body_length,
            "encoded request"
        );

        let mut packet = Vec::with_capacity(HEADER_SIZE + body.len());
        packet.put_u32_le(request_type.code());
        packet.put_u32_le(body_length);
        packet.put_u32_le(0); // request_id, assigned by the transport
        packet.put_slice(&body);
        Ok(packet)
    }
}

/// INSERT: `<space_no><flags><tuple>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    pub space_no: u32,
    pub values: Vec<Field>,
    pub return_tuple: bool,
}

impl Insert {
    pub fn new(space_no: u32, values: Vec<Field>) -> Self {
        Self {
            space_no,
            values,
            return_tuple: false,
        }
    }

    pub fn from_config(config: &Config, space_no: u32, values: Vec<Field>) -> Self {
        Self::new(space_no, values).return_tuple(config.return_tuple)
    }

    pub fn return_tuple(mut self, return_tuple: bool) -> Self {
        self.return_tuple = return_tuple;
        self
    }
}

impl RequestBody for Insert {
    fn request_type(&self) -> RequestType {
        RequestType::Insert
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<()> {
        if self.values.is_empty() {
            return Err(CodecError::EmptyTuple("insert"));
        }
        buf.put_u32_le(self.space_no);
        buf.put_u32_le(flags(self.return_tuple));
        put_tuple(buf, &self.values)
    }
}

/// DELETE: `<space_no><flags><key tuple>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    pub space_no: u32,
    pub key: Key,
    pub return_tuple: bool,
}

impl Delete {
    pub fn new(space_no: u32, key: impl Into<Key>) -> Self {
        Self {
            space_no,
            key: key.into(),
            return_tuple: false,
        }
    }

    pub fn from_config(config: &Config, space_no: u32, key: impl Into<Key>) -> Self {
        Self::new(space_no, key).return_tuple(config.return_tuple)
    }

    pub fn return_tuple(mut self, return_tuple: bool) -> Self {
        self.return_tuple = return_tuple;
        self
    }
}

impl RequestBody for Delete {
    fn request_type(&self) -> RequestType {
        RequestType::Delete
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u32_le(self.space_no);
        buf.put_u32_le(flags(self.return_tuple));
        put_tuple(buf, self.key.fields())
    }
}

/// UPDATE: `<space_no><flags><key tuple><op_count><operation>+`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub space_no: u32,
    pub key: Key,
    pub ops: Vec<UpdateOperation>,
    pub return_tuple: bool,
}

impl Update {
    pub fn new(space_no: u32, key: impl Into<Key>, ops: Vec<UpdateOperation>) -> Self {
        Self {
            space_no,
            key: key.into(),
            ops,
            return_tuple: false,
        }
    }

    pub fn from_config(
        config: &Config,
        space_no: u32,
        key: impl Into<Key>,
        ops: Vec<UpdateOperation>,
    ) -> Self {
        Self::new(space_no, key, ops).return_tuple(config.return_tuple)
    }

    pub fn return_tuple(mut self, return_tuple: bool) -> Self {
        self.return_tuple = return_tuple;
        self
    }
}

impl RequestBody for Update {
    fn request_type(&self) -> RequestType {
        RequestType::Update
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u32_le(self.space_no);
        buf.put_u32_le(flags(self.return_tuple));
        put_tuple(buf, self.key.fields())?;

        buf.put_u32_le(self.ops.len() as u32);
        for op in &self.ops {
            buf.put_u32_le(op.field_no);
            buf.put_u8(op.op.code());
            put_field(buf, &op.argument)?;
        }
        Ok(())
    }
}

/// SELECT: `<space_no><index_no><offset><limit><count><tuple>+`
///
/// Several keys may be looked up in one round trip; a key may hold more
/// than one field for composite indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub space_no: u32,
    pub index_no: u32,
    pub offset: u32,
    pub limit: u32,
    pub keys: Vec<Key>,
}

impl Select {
    /// Select on the primary index with no offset and no limit
    pub fn new(space_no: u32, keys: Vec<Key>) -> Self {
        Self {
            space_no,
            index_no: 0,
            offset: 0,
            limit: DEFAULT_SELECT_LIMIT,
            keys,
        }
    }

    pub fn from_config(config: &Config, space_no: u32, keys: Vec<Key>) -> Self {
        Self::new(space_no, keys)
            .index(config.default_index)
            .limit(config.default_select_limit)
    }

    pub fn index(mut self, index_no: u32) -> Self {
        self.index_no = index_no;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl RequestBody for Select {
    fn request_type(&self) -> RequestType {
        RequestType::Select
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u32_le(self.space_no);
        buf.put_u32_le(self.index_no);
        buf.put_u32_le(self.offset);
        buf.put_u32_le(self.limit);
        buf.put_u32_le(self.keys.len() as u32);
        for key in &self.keys {
            put_tuple(buf, key.fields())?;
        }
        Ok(())
    }
}

/// CALL: `<flags><proc_name field><args tuple>`
///
/// The server only accepts text arguments on this path, so every argument
/// is sent as its text form (integers as decimal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub proc_name: String,
    pub args: Vec<Field>,
    pub return_tuple: bool,
}

impl Call {
    pub fn new(proc_name: impl Into<String>, args: Vec<Field>) -> Self {
        Self {
            proc_name: proc_name.into(),
            args,
            return_tuple: false,
        }
    }

    pub fn return_tuple(mut self, return_tuple: bool) -> Self {
        self.return_tuple = return_tuple;
        self
    }
}

impl RequestBody for Call {
    fn request_type(&self) -> RequestType {
        RequestType::Call
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<()> {
        let args: Vec<Field> = self.args.iter().map(|a| Field::Text(a.as_text())).collect();

        buf.put_u32_le(flags(self.return_tuple));
        put_field(buf, &Field::Text(self.proc_name.clone()))?;
        put_tuple(buf, &args)
    }
}

/// PING: header only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ping;

impl RequestBody for Ping {
    fn request_type(&self) -> RequestType {
        RequestType::Ping
    }

    fn encode_body(&self, _buf: &mut BytesMut) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Request
// =============================================================================

/// Any request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Insert(Insert),
    Delete(Delete),
    Update(Update),
    Select(Select),
    Call(Call),
    Ping(Ping),
}

impl Request {
    fn body(&self) -> &dyn RequestBody {
        match self {
            Request::Insert(r) => r,
            Request::Delete(r) => r,
            Request::Update(r) => r,
            Request::Select(r) => r,
            Request::Call(r) => r,
            Request::Ping(r) => r,
        }
    }

    /// Get the request type
    pub fn request_type(&self) -> RequestType {
        self.body().request_type()
    }

    /// Encode the request to the exact bytes placed on the wire
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.body().encode()
    }
}

macro_rules! impl_from_body {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Request {
                fn from(body: $variant) -> Self {
                    Request::$variant(body)
                }
            }
        )*
    };
}

impl_from_body!(Insert, Delete, Update, Select, Call, Ping);

// =============================================================================
// Encoding shortcuts
// =============================================================================

/// Encode an INSERT request
pub fn encode_insert(space_no: u32, values: Vec<Field>, return_tuple: bool) -> Result<Vec<u8>> {
    Insert::new(space_no, values).return_tuple(return_tuple).encode()
}

/// Encode a DELETE request
pub fn encode_delete(space_no: u32, key: impl Into<Key>, return_tuple: bool) -> Result<Vec<u8>> {
    Delete::new(space_no, key).return_tuple(return_tuple).encode()
}

/// Encode an UPDATE request
pub fn encode_update(
    space_no: u32,
    key: impl Into<Key>,
    ops: Vec<UpdateOperation>,
    return_tuple: bool,
) -> Result<Vec<u8>> {
    Update::new(space_no, key, ops).return_tuple(return_tuple).encode()
}

/// Encode a SELECT request
pub fn encode_select(
    space_no: u32,
    index_no: u32,
    keys: Vec<Key>,
    offset: u32,
    limit: u32,
) -> Result<Vec<u8>> {
    Select::new(space_no, keys)
        .index(index_no)
        .offset(offset)
        .limit(limit)
        .encode()
}

/// Encode a CALL request
pub fn encode_call(proc_name: &str, args: Vec<Field>, return_tuple: bool) -> Result<Vec<u8>> {
    Call::new(proc_name, args).return_tuple(return_tuple).encode()
}

/// Encode a PING request
pub fn encode_ping() -> Vec<u8> {
    let mut packet = Vec::with_capacity(HEADER_SIZE);
    packet.put_u32_le(RequestType::Ping.code());
    packet.put_u32_le(0);
    packet.put_u32_le(0);
    packet
}
