//! Repository reading error types.

use crate::checksum::Checksum;
use crate::object::ObjectKind;
use thiserror::Error;

/// Errors that can occur while reading a remote repository.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The summary document could not be retrieved at all.
    #[error("summary unavailable: {0}")]
    SummaryUnavailable(String),

    /// The summary document did not match the expected shape.
    #[error("malformed summary: {0}")]
    MalformedSummary(String),

    /// A checksum string or byte slice had the wrong length or digits.
    #[error("invalid checksum: {0}")]
    InvalidChecksum(String),

    /// A metadata object failed to decode.
    #[error("malformed {kind} object {checksum}: {reason}")]
    ObjectDecode {
        kind: ObjectKind,
        checksum: Checksum,
        reason: String,
    },

    /// The object graph references an object the store does not have.
    #[error("missing {kind} object {checksum}")]
    MissingObject {
        kind: ObjectKind,
        checksum: Checksum,
    },

    /// Fetched content did not hash to the requested checksum.
    #[error("corrupt object {expected}: content hashes to {actual}")]
    Corruption {
        expected: Checksum,
        actual: Checksum,
    },

    /// A fetch failed permanently, or the transient retry budget ran out.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// HTTP client construction or transport failure outside the retry path.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepoError>;
