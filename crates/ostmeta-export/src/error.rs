//! Export error types.

use ostmeta_repo::RepoError;
use thiserror::Error;

/// Errors that abort a whole export run.
///
/// Per-ref failures never surface here; they become
/// [`SkipReason`](crate::record::SkipReason) diagnostics in the report.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The summary could not be fetched or decoded; nothing to enumerate.
    #[error("fatal repository error: {0}")]
    Repo(#[from] RepoError),

    /// The run was cancelled from outside.
    #[error("run cancelled")]
    Cancelled,
}

/// A specialized Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
