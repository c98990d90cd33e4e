//! Commit object decoding.

use crate::checksum::Checksum;
use crate::object::ObjectKind;
use crate::{RepoError, Result};
use ostmeta_variant::{decode, Endian, Value};

/// Signature of a commit object: metadata dictionary, parent checksum bytes,
/// related refs, subject, body, timestamp, root tree checksum, root
/// metadata checksum.
pub const COMMIT_SIGNATURE: &str = "(a{sv}aya(say)sstayay)";

/// The parts of a commit this reader needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Checksum of the root directory tree.
    pub root_tree: Checksum,
    /// Checksum of the root directory's metadata object.
    pub root_meta: Checksum,
    /// Checksum of the parent commit, absent for the first commit of a ref.
    pub parent: Option<Checksum>,
}

/// Decodes a commit object.
pub fn decode_commit(checksum: &Checksum, bytes: &[u8]) -> Result<CommitInfo> {
    let fail = |reason: String| RepoError::ObjectDecode {
        kind: ObjectKind::Commit,
        checksum: *checksum,
        reason,
    };

    let value = decode(bytes, Endian::Little, COMMIT_SIGNATURE).map_err(|e| fail(e.to_string()))?;
    let members = value
        .as_tuple()
        .ok_or_else(|| fail("not a tuple".into()))?;
    let [_metadata, parent, _related, _subject, _body, _timestamp, root_tree, root_meta] = members
    else {
        return Err(fail(format!("expected 8 members, found {}", members.len())));
    };

    let parent = parent
        .as_bytes()
        .ok_or_else(|| fail("parent is not a byte array".into()))?;
    let parent = if parent.is_empty() {
        None
    } else {
        Some(
            Checksum::from_slice(parent)
                .map_err(|_| fail(format!("parent checksum has length {}", parent.len())))?,
        )
    };

    let root_tree = checksum_member(root_tree, "root tree").map_err(&fail)?;
    let root_meta = checksum_member(root_meta, "root metadata").map_err(&fail)?;

    Ok(CommitInfo {
        root_tree,
        root_meta,
        parent,
    })
}

fn checksum_member(value: &Value, what: &str) -> std::result::Result<Checksum, String> {
    let bytes = value
        .as_bytes()
        .ok_or_else(|| format!("{what} is not a byte array"))?;
    Checksum::from_slice(bytes).map_err(|_| format!("{what} checksum has length {}", bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostmeta_variant::encode;

    fn commit_value(
        parent: Option<[u8; 32]>,
        root_tree: [u8; 32],
        root_meta: [u8; 32],
    ) -> Value {
        Value::Tuple(vec![
            Value::Dict(vec![]),
            Value::Bytes(parent.map(|p| p.to_vec()).unwrap_or_default()),
            Value::Array(vec![]),
            Value::Str("snapshot".into()),
            Value::Str(String::new()),
            Value::U64(1_700_000_000),
            Value::Bytes(root_tree.to_vec()),
            Value::Bytes(root_meta.to_vec()),
        ])
    }

    #[test]
    fn test_decode_commit() {
        let bytes = encode(&commit_value(Some([3; 32]), [1; 32], [2; 32]), Endian::Little);
        let checksum = Checksum::digest(&bytes);
        let info = decode_commit(&checksum, &bytes).unwrap();
        assert_eq!(info.root_tree, Checksum::from_bytes([1; 32]));
        assert_eq!(info.root_meta, Checksum::from_bytes([2; 32]));
        assert_eq!(info.parent, Some(Checksum::from_bytes([3; 32])));
    }

    #[test]
    fn test_decode_commit_without_parent() {
        let bytes = encode(&commit_value(None, [1; 32], [2; 32]), Endian::Little);
        let info = decode_commit(&Checksum::digest(&bytes), &bytes).unwrap();
        assert_eq!(info.parent, None);
    }

    #[test]
    fn test_decode_commit_rejects_garbage() {
        let checksum = Checksum::from_bytes([0; 32]);
        let err = decode_commit(&checksum, b"not a commit").unwrap_err();
        assert!(matches!(
            err,
            RepoError::ObjectDecode {
                kind: ObjectKind::Commit,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_commit_rejects_short_root_tree() {
        let mut value = commit_value(None, [1; 32], [2; 32]);
        if let Value::Tuple(members) = &mut value {
            members[6] = Value::Bytes(vec![1; 16]);
        }
        let bytes = encode(&value, Endian::Little);
        let err = decode_commit(&Checksum::digest(&bytes), &bytes).unwrap_err();
        assert!(err.to_string().contains("root tree"));
    }
}
