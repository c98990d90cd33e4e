//! Remote repository reading for ostmeta.
//!
//! A published repository is a content-addressed object store behind plain
//! HTTP(S): a binary `summary` document enumerates refs and their commit
//! checksums, and `objects/<xx>/<rest>.<suffix>` holds commits, directory
//! trees, directory metadata, and file content, each addressed by the
//! SHA-256 of its bytes. This crate reads that layout:
//!
//! - [`summary::decode_summary`] turns summary bytes into ordered
//!   [`RefEntry`] lists
//! - [`ObjectStoreClient`] fetches objects with retry confined to the
//!   transport layer and verifies content against its checksum
//! - [`TreeWalker`] resolves logical paths like `metadata` or
//!   `app/manifest.json` through the commit/tree graph

pub mod checksum;
pub mod client;
pub mod commit;
pub mod error;
pub mod object;
pub mod summary;
pub mod tree;

pub use checksum::Checksum;
pub use client::{ClientConfig, ObjectStoreClient};
pub use commit::{decode_commit, CommitInfo, COMMIT_SIGNATURE};
pub use error::{RepoError, Result};
pub use object::{relative_path, ObjectKind, COMPRESSED_FILE_SUFFIX};
pub use summary::{decode_summary, RefEntry, SUMMARY_SIGNATURE};
pub use tree::{
    decode_dirmeta, decode_dirtree, DirEntry, DirMeta, FileEntry, TreeNode, TreeWalker,
    DIRMETA_SIGNATURE, DIRTREE_SIGNATURE,
};
