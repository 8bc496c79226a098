//! # tarantool-codec
//!
//! Client-side binary codec for the Tarantool 1.5 wire protocol:
//! - Varint and fixed-width primitives
//! - Length-prefixed field and tuple packing
//! - Request encoding (insert, delete, update, select, call, ping)
//! - Response decoding with a typed error channel and optional casting
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Transport (not in this crate)               │
//! └──────────────┬─────────────────────────────▲────────────────┘
//!                │ bytes                       │ bytes
//! ┌──────────────▼──────────────┐ ┌────────────┴────────────────┐
//! │      Response Parser        │ │      Request Builder        │
//! │ header, status, rows, cast  │ │ header + per-type body      │
//! └──────────────┬──────────────┘ └────────────▲────────────────┘
//!                │                             │
//! ┌──────────────▼─────────────────────────────┴────────────────┐
//! │                        Tuple Codec                          │
//! │           <cardinality><varint len><payload>...             │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼──────────────────────────────┐
//! │                      Primitive Codec                        │
//! │              varint, fixed32, fixed64 (LE)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function is pure: no shared mutable state, no I/O outside the
//! stream helpers.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CodecError, Result};
pub use config::Config;
pub use protocol::{Field, FieldType, Request, Response, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the codec
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
