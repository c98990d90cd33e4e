//! Cursor-based reader for the container format.
//!
//! All offsets are absolute: alignment is computed from the start of the
//! buffer, including inside variant frames, so the same bytes decode to the
//! same value regardless of how the read is nested. Every read is
//! bounds-checked and fails with [`VariantError::Truncated`] instead of
//! reading past the end.

use crate::signature::Type;
use crate::{Result, VariantError};

/// Byte order of the serialized data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Little-endian, the order repository files are written in.
    #[default]
    Little,
    Big,
}

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    Tuple(Vec<Value>),
    Variant { signature: String, value: Box<Value> },
}

impl Value {
    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the u64 value, if this is a u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the u32 value, if this is a u32.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is a byte array.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is a dictionary.
    pub fn as_dict(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the members, if this is a tuple.
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Self::Tuple(members) => Some(members),
            _ => None,
        }
    }

    /// Unwraps one level of variant framing, if this is a variant.
    pub fn as_variant(&self) -> Option<&Value> {
        match self {
            Self::Variant { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Upper bound on speculative `Vec` pre-allocation for wire-supplied counts.
const MAX_PREALLOC: usize = 4096;

/// A bounds-checked cursor over a byte buffer.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    limit: usize,
    endian: Endian,
}

impl<'a> Reader<'a> {
    /// Creates a reader over the whole buffer.
    pub fn new(buf: &'a [u8], endian: Endian) -> Self {
        Self {
            buf,
            pos: 0,
            limit: buf.len(),
            endian,
        }
    }

    /// Current absolute offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the read limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    /// Reads one value of the given type, advancing the cursor.
    pub fn read(&mut self, ty: &Type) -> Result<Value> {
        match ty {
            Type::U8 => Ok(Value::U8(self.take(1)?[0])),
            Type::U16 => {
                self.align_to(2)?;
                let raw = self.take(2)?;
                let raw = [raw[0], raw[1]];
                Ok(Value::U16(match self.endian {
                    Endian::Little => u16::from_le_bytes(raw),
                    Endian::Big => u16::from_be_bytes(raw),
                }))
            }
            Type::U32 => Ok(Value::U32(self.read_u32()?)),
            Type::U64 => {
                self.align_to(8)?;
                let raw = self.take(8)?;
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(raw);
                Ok(Value::U64(match self.endian {
                    Endian::Little => u64::from_le_bytes(bytes),
                    Endian::Big => u64::from_be_bytes(bytes),
                }))
            }
            Type::Bool => {
                let offset = self.pos;
                match self.take(1)?[0] {
                    0 => Ok(Value::Bool(false)),
                    1 => Ok(Value::Bool(true)),
                    value => Err(VariantError::BadBool { offset, value }),
                }
            }
            Type::Str => {
                let len = self.read_len()?;
                let offset = self.pos;
                let raw = self.take(len)?;
                let s = std::str::from_utf8(raw).map_err(|_| VariantError::Utf8 { offset })?;
                Ok(Value::Str(s.to_string()))
            }
            Type::Bytes => {
                let len = self.read_len()?;
                Ok(Value::Bytes(self.take(len)?.to_vec()))
            }
            Type::Array(elem) => {
                let count = self.read_len()?;
                let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
                for _ in 0..count {
                    items.push(self.read(elem)?);
                }
                Ok(Value::Array(items))
            }
            Type::Dict(key, value) => {
                let count = self.read_len()?;
                let mut entries = Vec::with_capacity(count.min(MAX_PREALLOC));
                for _ in 0..count {
                    let k = self.read(key)?;
                    let v = self.read(value)?;
                    entries.push((k, v));
                }
                Ok(Value::Dict(entries))
            }
            Type::Tuple(members) => {
                let mut values = Vec::with_capacity(members.len());
                for member in members {
                    values.push(self.read(member)?);
                }
                Ok(Value::Tuple(values))
            }
            Type::Variant => self.read_variant(),
        }
    }

    /// Reads a framed variant: u32 frame length, then value bytes, a NUL
    /// separator, and the value's signature.
    fn read_variant(&mut self) -> Result<Value> {
        let len = self.read_len()?;
        let start = self.pos;
        let frame = self.take(len)?;
        let sep = frame
            .iter()
            .rposition(|&b| b == 0)
            .ok_or_else(|| VariantError::Signature("variant frame lacks separator".into()))?;
        let signature = std::str::from_utf8(&frame[sep + 1..])
            .map_err(|_| VariantError::Utf8 { offset: start + sep + 1 })?;
        let ty = Type::parse(signature)?;

        // Decode in place so alignment stays relative to the buffer start.
        let mut inner = Reader {
            buf: self.buf,
            pos: start,
            limit: start + sep,
            endian: self.endian,
        };
        let value = inner.read(&ty)?;
        if inner.pos != inner.limit {
            return Err(VariantError::TrailingBytes { offset: inner.pos });
        }
        Ok(Value::Variant {
            signature: signature.to_string(),
            value: Box::new(value),
        })
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.align_to(4)?;
        let raw = self.take(4)?;
        let bytes = [raw[0], raw[1], raw[2], raw[3]];
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    fn read_len(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    fn align_to(&mut self, align: usize) -> Result<()> {
        let aligned = self.pos.div_ceil(align) * align;
        if aligned > self.limit {
            return Err(VariantError::Truncated {
                offset: self.pos,
                needed: aligned - self.pos,
            });
        }
        self.pos = aligned;
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.limit);
        match end {
            Some(end) => {
                let slice = &self.buf[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(VariantError::Truncated {
                offset: self.pos,
                needed: n,
            }),
        }
    }
}

/// Decodes a complete buffer as one value of the given signature.
///
/// The whole buffer must be consumed; leftover bytes are an error, which
/// catches documents whose shape does not match the expected signature.
pub fn decode(buf: &[u8], endian: Endian, signature: &str) -> Result<Value> {
    let ty = Type::parse(signature)?;
    let mut reader = Reader::new(buf, endian);
    let value = reader.read(&ty)?;
    if reader.pos != buf.len() {
        return Err(VariantError::TrailingBytes { offset: reader.pos });
    }
    Ok(value)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::writer::encode;
    use proptest::prelude::*;

    fn value_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<u8>().prop_map(Value::U8),
            any::<u16>().prop_map(Value::U16),
            any::<u32>().prop_map(Value::U32),
            any::<u64>().prop_map(Value::U64),
            any::<bool>().prop_map(Value::Bool),
            "[a-zA-Z0-9/._-]{0,24}".prop_map(Value::Str),
            prop::collection::vec(any::<u8>(), 0..48).prop_map(Value::Bytes),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                // Arrays must stay homogeneous for a signature to exist; a
                // repeated single element keeps the generator simple.
                inner
                    .clone()
                    .prop_flat_map(|v| (Just(v), 1usize..4))
                    .prop_map(|(v, n)| Value::Array(vec![v; n])),
                (inner.clone(), inner.clone())
                    .prop_map(|(a, b)| Value::Tuple(vec![a, b])),
                inner.prop_map(|v| {
                    let signature = crate::writer::signature_of(&v);
                    Value::Variant {
                        signature,
                        value: Box::new(v),
                    }
                }),
            ]
        })
    }

    proptest! {
        /// Property: encode then decode is the identity.
        #[test]
        fn prop_roundtrip(value in value_strategy()) {
            let signature = crate::writer::signature_of(&value);
            for endian in [Endian::Little, Endian::Big] {
                let buf = encode(&value, endian);
                let decoded = decode(&buf, endian, &signature).unwrap();
                prop_assert_eq!(&decoded, &value);
            }
        }

        /// Property: arbitrary bytes never panic the decoder.
        #[test]
        fn prop_garbage_no_panic(data in prop::collection::vec(any::<u8>(), 0..256)) {
            for sig in ["(a(s(ayv))a{sv})", "(a{sv}aya(say)sstayay)", "(a(say)a(sayay))", "v"] {
                let _ = decode(&data, Endian::Little, sig);
            }
        }

        /// Property: every prefix of a valid encoding either decodes or
        /// fails cleanly, never reads out of bounds.
        #[test]
        fn prop_prefix_no_panic(value in value_strategy(), cut in 0usize..64) {
            let signature = crate::writer::signature_of(&value);
            let buf = encode(&value, Endian::Little);
            let cut = cut.min(buf.len());
            let _ = decode(&buf[..cut], Endian::Little, &signature);
        }
    }
}
