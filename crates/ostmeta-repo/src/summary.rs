//! Summary document decoding.
//!
//! The summary is a single binary document at the repository root listing
//! every published ref and its commit checksum, fetched once so enumeration
//! needs no per-ref round-trips.

use crate::checksum::Checksum;
use crate::{RepoError, Result};
use ostmeta_variant::{decode, Endian, Value};

/// Signature of the summary document: an array of
/// `(ref-name, (checksum-bytes, size-metadata-variant))` pairs plus a
/// repository metadata dictionary.
pub const SUMMARY_SIGNATURE: &str = "(a(s(ayv))a{sv})";

/// One advertised ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// Ref name, e.g. `app/org.example.App/x86_64/stable`.
    pub name: String,
    /// Checksum of the commit the ref points at.
    pub checksum: Checksum,
    /// Advertised download size, when the producer included one.
    pub size_hint: Option<u64>,
}

/// Decodes summary bytes into ref entries, preserving producer order.
///
/// The producer writes refs pre-sorted; that order is the canonical
/// enumeration order downstream, so no re-sorting happens here. Any shape
/// mismatch is [`RepoError::MalformedSummary`], fatal for the whole run.
pub fn decode_summary(bytes: &[u8]) -> Result<Vec<RefEntry>> {
    let document = decode(bytes, Endian::Little, SUMMARY_SIGNATURE)
        .map_err(|e| RepoError::MalformedSummary(e.to_string()))?;
    let members = document
        .as_tuple()
        .ok_or_else(|| malformed("top-level value is not a tuple"))?;
    let [refs, _metadata] = members else {
        return Err(malformed("top-level tuple is not a pair"));
    };
    let refs = refs
        .as_array()
        .ok_or_else(|| malformed("refs member is not an array"))?;

    let mut entries = Vec::with_capacity(refs.len());
    for entry in refs {
        entries.push(decode_ref_entry(entry)?);
    }
    Ok(entries)
}

fn decode_ref_entry(entry: &Value) -> Result<RefEntry> {
    let [name, detail] = entry
        .as_tuple()
        .ok_or_else(|| malformed("ref entry is not a tuple"))?
    else {
        return Err(malformed("ref entry is not a pair"));
    };
    let name = name
        .as_str()
        .ok_or_else(|| malformed("ref name is not a string"))?;
    let [checksum, size] = detail
        .as_tuple()
        .ok_or_else(|| malformed("ref detail is not a tuple"))?
    else {
        return Err(malformed("ref detail is not a pair"));
    };
    let checksum = checksum
        .as_bytes()
        .ok_or_else(|| malformed("ref checksum is not a byte array"))
        .and_then(|bytes| {
            Checksum::from_slice(bytes)
                .map_err(|_| malformed(&format!("ref {name:?} checksum has length {}", bytes.len())))
        })?;
    // Size metadata is advisory; anything but a u64 is ignored.
    let size_hint = size.as_variant().and_then(Value::as_u64);
    Ok(RefEntry {
        name: name.to_string(),
        checksum,
        size_hint,
    })
}

fn malformed(reason: &str) -> RepoError {
    RepoError::MalformedSummary(reason.to_string())
}
