//! KeyFile conversion error types.

use thiserror::Error;

/// Errors raised while converting a metadata keyfile.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyFileError {
    /// A line was neither blank, a comment, a section header, nor a
    /// well-formed assignment.
    #[error("syntax error at line {line}: {reason}")]
    Syntax { line: usize, reason: String },
}

impl KeyFileError {
    pub(crate) fn at(line: usize, reason: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for keyfile conversion.
pub type Result<T> = std::result::Result<T, KeyFileError>;
