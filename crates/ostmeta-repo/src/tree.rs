//! Directory tree decoding and path resolution.
//!
//! The object graph is a hash-linked DAG: commits point at directory trees,
//! trees point at file content and subtrees by checksum. Resolution fetches
//! objects on demand instead of materializing the graph; no cycles are
//! possible.

use crate::checksum::Checksum;
use crate::client::ObjectStoreClient;
use crate::commit::{decode_commit, CommitInfo};
use crate::object::ObjectKind;
use crate::{RepoError, Result};
use bytes::Bytes;
use ostmeta_variant::{decode, Endian, Value};

/// Signature of a directory tree object: file entries (name, content
/// checksum) and subdirectory entries (name, tree checksum, meta checksum).
pub const DIRTREE_SIGNATURE: &str = "(a(say)a(sayay))";

/// Signature of a directory metadata object: uid, gid, mode, xattrs.
pub const DIRMETA_SIGNATURE: &str = "(uuua(ayay))";

/// A file entry in a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub checksum: Checksum,
}

/// A subdirectory entry in a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub tree: Checksum,
    pub meta: Checksum,
}

/// A decoded directory tree, entries in stored order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeNode {
    pub files: Vec<FileEntry>,
    pub dirs: Vec<DirEntry>,
}

/// A decoded directory metadata object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirMeta {
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
}

/// Decodes a directory tree object.
pub fn decode_dirtree(checksum: &Checksum, bytes: &[u8]) -> Result<TreeNode> {
    let fail = |reason: String| RepoError::ObjectDecode {
        kind: ObjectKind::DirTree,
        checksum: *checksum,
        reason,
    };

    let value = decode(bytes, Endian::Little, DIRTREE_SIGNATURE).map_err(|e| fail(e.to_string()))?;
    let members = value.as_tuple().ok_or_else(|| fail("not a tuple".into()))?;
    let [files, dirs] = members else {
        return Err(fail("expected two entry lists".into()));
    };

    let mut node = TreeNode::default();
    for entry in files.as_array().ok_or_else(|| fail("bad file list".into()))? {
        let [name, content] = entry
            .as_tuple()
            .ok_or_else(|| fail("bad file entry".into()))?
        else {
            return Err(fail("file entry is not a pair".into()));
        };
        node.files.push(FileEntry {
            name: string_member(name).map_err(&fail)?,
            checksum: checksum_member(content).map_err(&fail)?,
        });
    }
    for entry in dirs.as_array().ok_or_else(|| fail("bad dir list".into()))? {
        let [name, tree, meta] = entry
            .as_tuple()
            .ok_or_else(|| fail("bad dir entry".into()))?
        else {
            return Err(fail("dir entry is not a triple".into()));
        };
        node.dirs.push(DirEntry {
            name: string_member(name).map_err(&fail)?,
            tree: checksum_member(tree).map_err(&fail)?,
            meta: checksum_member(meta).map_err(&fail)?,
        });
    }
    Ok(node)
}

/// Decodes a directory metadata object.
pub fn decode_dirmeta(checksum: &Checksum, bytes: &[u8]) -> Result<DirMeta> {
    let fail = |reason: String| RepoError::ObjectDecode {
        kind: ObjectKind::DirMeta,
        checksum: *checksum,
        reason,
    };

    let value = decode(bytes, Endian::Little, DIRMETA_SIGNATURE).map_err(|e| fail(e.to_string()))?;
    let members = value.as_tuple().ok_or_else(|| fail("not a tuple".into()))?;
    let [uid, gid, mode, _xattrs] = members else {
        return Err(fail("expected four members".into()));
    };
    let field = |value: &Value, what: &str| {
        value
            .as_u32()
            .ok_or_else(|| fail(format!("{what} is not a u32")))
    };
    Ok(DirMeta {
        uid: field(uid, "uid")?,
        gid: field(gid, "gid")?,
        mode: field(mode, "mode")?,
    })
}

fn string_member(value: &Value) -> std::result::Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| "entry name is not a string".into())
}

fn checksum_member(value: &Value) -> std::result::Result<Checksum, String> {
    let bytes = value
        .as_bytes()
        .ok_or_else(|| "entry checksum is not a byte array".to_string())?;
    Checksum::from_slice(bytes).map_err(|_| format!("entry checksum has length {}", bytes.len()))
}

/// Walks the commit/tree graph of one ref, fetching objects on demand.
pub struct TreeWalker<'a> {
    client: &'a ObjectStoreClient,
}

impl<'a> TreeWalker<'a> {
    /// Creates a walker over the given store.
    pub fn new(client: &'a ObjectStoreClient) -> Self {
        Self { client }
    }

    /// Fetches and decodes the commit a ref points at.
    pub async fn load_commit(&self, checksum: &Checksum) -> Result<CommitInfo> {
        let bytes = self.require(checksum, ObjectKind::Commit).await?;
        decode_commit(checksum, &bytes)
    }

    /// Fetches and decodes one directory tree.
    pub async fn load_tree(&self, checksum: &Checksum) -> Result<TreeNode> {
        let bytes = self.require(checksum, ObjectKind::DirTree).await?;
        decode_dirtree(checksum, &bytes)
    }

    /// Resolves a slash-separated logical path to a file content checksum.
    ///
    /// `Ok(None)` means the path does not exist in this tree — an expected
    /// outcome, not an error. A tree object that is referenced but absent
    /// from the store is [`RepoError::MissingObject`].
    pub async fn resolve_path(
        &self,
        root_tree: &Checksum,
        path: &str,
    ) -> Result<Option<Checksum>> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file_name, dir_names)) = segments.split_last() else {
            return Ok(None);
        };

        let mut node = self.load_tree(root_tree).await?;
        for name in dir_names {
            let Some(dir) = node.dirs.iter().find(|d| d.name == *name) else {
                return Ok(None);
            };
            let subtree = dir.tree;
            node = self.load_tree(&subtree).await?;
        }
        Ok(node
            .files
            .iter()
            .find(|f| f.name == *file_name)
            .map(|f| f.checksum))
    }

    /// Resolves a path and fetches the file's content.
    pub async fn read_file(&self, root_tree: &Checksum, path: &str) -> Result<Option<Bytes>> {
        match self.resolve_path(root_tree, path).await? {
            Some(checksum) => self.require(&checksum, ObjectKind::File).await.map(Some),
            None => Ok(None),
        }
    }

    async fn require(&self, checksum: &Checksum, kind: ObjectKind) -> Result<Bytes> {
        self.client
            .fetch(checksum, kind)
            .await?
            .ok_or(RepoError::MissingObject {
                kind,
                checksum: *checksum,
            })
    }
}
