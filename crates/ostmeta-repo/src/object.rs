//! Object kinds and content-addressed storage paths.

use crate::checksum::Checksum;
use std::fmt;

/// The kinds of object a repository stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A versioned snapshot pointing at a root directory tree.
    Commit,
    /// A directory's file and subdirectory entries.
    DirTree,
    /// A directory's permission metadata.
    DirMeta,
    /// Raw file content.
    File,
}

impl ObjectKind {
    /// Returns the storage suffix for the uncompressed representation.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::DirTree => "dirtree",
            Self::DirMeta => "dirmeta",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Suffix of the zlib-compressed file-content representation.
pub const COMPRESSED_FILE_SUFFIX: &str = "filez";

/// Derives the store-relative path for an object.
///
/// The first two hex characters name the fan-out directory, the remaining
/// sixty-two the file; this split must match the repository layout exactly.
pub fn relative_path(checksum: &Checksum, suffix: &str) -> String {
    let hex = checksum.to_hex();
    format!("objects/{}/{}.{}", &hex[..2], &hex[2..], suffix)
}
