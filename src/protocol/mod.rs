//! Protocol Module
//!
//! Binary codec for the Tarantool 1.5 wire protocol.
//!
//! ## Packet Format
//! ```text
//! ┌──────────────┬─────────────────┬────────────────┬──────────────────┐
//! │ Type (4)     │ Body Len (4)    │ Request Id (4) │      Body        │
//! └──────────────┴─────────────────┴────────────────┴──────────────────┘
//! ```
//! All fixed-width integers are little-endian.
//!
//! ### Request Types
//! - 13: INSERT  - `<space_no><flags><tuple>`
//! - 17: SELECT  - `<space_no><index_no><offset><limit><count><tuple>+`
//! - 19: UPDATE  - `<space_no><flags><tuple><count><operation>+`
//! - 21: DELETE  - `<space_no><flags><tuple>`
//! - 22: CALL    - `<flags><proc_name><tuple>`
//! - 0xFF00: PING - empty
//!
//! ### Response Body
//! ```text
//! ┌────────────┬───────────┬──────────────────────────────┐
//! │ Status (4) │ Count (4) │ (<tuple_size(4)><tuple>)*    │
//! └────────────┴───────────┴──────────────────────────────┘
//! ```

mod varint;
mod field;
mod tuple;
mod request;
mod response;
mod codec;

/// Size of the packet header: type + body length + request id
pub const HEADER_SIZE: usize = 12;

pub use varint::{
    decode_fixed32, decode_fixed64, decode_varint, encode_fixed32, encode_fixed64,
    encode_varint, put_varint, varint_len, VARINT_MAX_BYTES, VARINT_MAX_VALUE,
};
pub use field::{Field, FieldType, Value};
pub use tuple::{decode_tuple, decode_tuple_at, encode_field, encode_tuple, put_field, put_tuple};
pub use request::{
    encode_call, encode_delete, encode_insert, encode_ping, encode_select, encode_update, Call,
    Delete, Insert, Key, Ping, Request, RequestBody, RequestType, Select, Update, UpdateOpCode,
    UpdateOperation, FLAG_RETURN_TUPLE,
};
pub use response::{decode_response, split_status, CompletionStatus, Header, Response};
pub use codec::{read_header, read_response, write_request};
