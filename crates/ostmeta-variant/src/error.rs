//! Container decode error types.

use thiserror::Error;

/// Errors that can occur while decoding or encoding container data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariantError {
    /// The buffer ended before a structurally required read.
    #[error("truncated data: need {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// A type signature could not be parsed.
    #[error("invalid type signature: {0}")]
    Signature(String),

    /// A string value was not valid UTF-8.
    #[error("invalid UTF-8 in string at offset {offset}")]
    Utf8 { offset: usize },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte {value:#04x} at offset {offset}")]
    BadBool { offset: usize, value: u8 },

    /// Bytes remained after the value that should have ended the buffer.
    #[error("trailing bytes after value at offset {offset}")]
    TrailingBytes { offset: usize },
}

/// A specialized Result type for container operations.
pub type Result<T> = std::result::Result<T, VariantError>;
