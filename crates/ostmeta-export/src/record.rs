//! Output records and the run report.

use ostmeta_keyfile::KeyFileError;
use ostmeta_repo::RepoError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// One exported ref, in the output array's element shape.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    /// The full ref name.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// The converted `metadata` document.
    pub metadata: Value,
    /// The canonicalized build manifest; omitted entirely when the ref was
    /// not built with the manifest-embedding tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Value>,
}

/// Why a ref was dropped from the output.
#[derive(Debug, Error)]
pub enum SkipReason {
    /// Every valid app ref carries a `metadata` file; one without it is
    /// malformed.
    #[error("metadata file missing from tree")]
    MetadataMissing,

    /// The `metadata` file was not UTF-8 text.
    #[error("metadata is not valid UTF-8")]
    MetadataNotUtf8,

    /// The `metadata` file did not parse.
    #[error("metadata: {0}")]
    MetadataSyntax(#[from] KeyFileError),

    /// Commit/tree decode failure, missing object, corruption, or fetch
    /// failure after the retry budget.
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A dropped ref and its diagnostic, reported out-of-band.
#[derive(Debug)]
pub struct SkippedRef {
    pub ref_name: String,
    pub reason: SkipReason,
}

/// The outcome of one export run.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Successfully exported refs, in summary enumeration order.
    pub records: Vec<ResultRecord>,
    /// Refs dropped with diagnostics; never mixed into the JSON array.
    pub skipped: Vec<SkippedRef>,
    /// Refs the summary advertised before filtering.
    pub refs_enumerated: usize,
}

impl ExportReport {
    /// True when every selected ref was exported.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// True when the run produced no usable refs at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
