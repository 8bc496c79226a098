//! Configuration for the Tarantool codec
//!
//! Defaults for request construction and limits for stream decoding.

use crate::protocol::FieldType;

/// Default maximum response body accepted by the stream helpers (16 MB)
pub const DEFAULT_MAX_BODY_SIZE: u32 = 16 * 1024 * 1024;

/// Default SELECT limit (no limit)
pub const DEFAULT_SELECT_LIMIT: u32 = 0xFFFF_FFFF;

/// Main configuration for codec consumers
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Decode Configuration
    // -------------------------------------------------------------------------
    /// Largest body_length accepted by `read_response` (in bytes)
    pub max_body_size: u32,

    /// Column types applied to every decoded row by `read_response`.
    /// The last entry repeats for extra columns.
    pub field_types: Option<Vec<FieldType>>,

    // -------------------------------------------------------------------------
    // Request Defaults
    // -------------------------------------------------------------------------
    /// Index used by SELECT when none is given
    pub default_index: u32,

    /// Row limit used by SELECT when none is given
    pub default_select_limit: u32,

    /// Ask the server to return the affected tuple
    pub return_tuple: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            field_types: None,
            default_index: 0,
            default_select_limit: DEFAULT_SELECT_LIMIT,
            return_tuple: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Field types as a slice, if any were configured
    pub fn field_types(&self) -> Option<&[FieldType]> {
        self.field_types.as_deref()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum response body size (in bytes)
    pub fn max_body_size(mut self, size: u32) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Set the column types used to cast decoded rows
    pub fn field_types(mut self, types: impl Into<Vec<FieldType>>) -> Self {
        self.config.field_types = Some(types.into());
        self
    }

    /// Set the default SELECT index
    pub fn default_index(mut self, index: u32) -> Self {
        self.config.default_index = index;
        self
    }

    /// Set the default SELECT limit
    pub fn default_select_limit(mut self, limit: u32) -> Self {
        self.config.default_select_limit = limit;
        self
    }

    /// Set whether write requests ask for the affected tuple
    pub fn return_tuple(mut self, return_tuple: bool) -> Self {
        self.config.return_tuple = return_tuple;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
