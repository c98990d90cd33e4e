//! Writer mirroring [`crate::reader`], used to build fixtures and fuzz seeds.
//!
//! Writing a repository is not a goal of this workspace; the writer exists so
//! tests can construct byte-exact documents for the decoder.

use crate::reader::{Endian, Value};

/// Serializes values with the same alignment rules the reader enforces.
pub struct Writer {
    buf: Vec<u8>,
    endian: Endian,
}

impl Writer {
    /// Creates an empty writer.
    pub fn new(endian: Endian) -> Self {
        Self {
            buf: Vec::new(),
            endian,
        }
    }

    /// Consumes the writer and returns the serialized bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Appends one value.
    pub fn write(&mut self, value: &Value) {
        match value {
            Value::U8(v) => self.buf.push(*v),
            Value::U16(v) => {
                self.align_to(2);
                self.put(&v.to_le_bytes(), &v.to_be_bytes());
            }
            Value::U32(v) => {
                self.align_to(4);
                self.put(&v.to_le_bytes(), &v.to_be_bytes());
            }
            Value::U64(v) => {
                self.align_to(8);
                self.put(&v.to_le_bytes(), &v.to_be_bytes());
            }
            Value::Bool(v) => self.buf.push(u8::from(*v)),
            Value::Str(s) => {
                self.put_len(s.len());
                self.buf.extend_from_slice(s.as_bytes());
            }
            Value::Bytes(b) => {
                self.put_len(b.len());
                self.buf.extend_from_slice(b);
            }
            Value::Array(items) => {
                self.put_len(items.len());
                for item in items {
                    self.write(item);
                }
            }
            Value::Dict(entries) => {
                self.put_len(entries.len());
                for (key, val) in entries {
                    self.write(key);
                    self.write(val);
                }
            }
            Value::Tuple(members) => {
                for member in members {
                    self.write(member);
                }
            }
            Value::Variant { signature, value } => {
                self.align_to(4);
                let len_pos = self.buf.len();
                self.buf.extend_from_slice(&[0u8; 4]);
                let start = self.buf.len();
                self.write(value);
                self.buf.push(0);
                self.buf.extend_from_slice(signature.as_bytes());
                let len = (self.buf.len() - start) as u32;
                let len_bytes = match self.endian {
                    Endian::Little => len.to_le_bytes(),
                    Endian::Big => len.to_be_bytes(),
                };
                self.buf[len_pos..len_pos + 4].copy_from_slice(&len_bytes);
            }
        }
    }

    fn put(&mut self, le: &[u8], be: &[u8]) {
        match self.endian {
            Endian::Little => self.buf.extend_from_slice(le),
            Endian::Big => self.buf.extend_from_slice(be),
        }
    }

    fn put_len(&mut self, len: usize) {
        self.align_to(4);
        let len = len as u32;
        self.put(&len.to_le_bytes(), &len.to_be_bytes());
    }

    fn align_to(&mut self, align: usize) {
        while self.buf.len() % align != 0 {
            self.buf.push(0);
        }
    }
}

/// Serializes a single value.
pub fn encode(value: &Value, endian: Endian) -> Vec<u8> {
    let mut writer = Writer::new(endian);
    writer.write(value);
    writer.into_bytes()
}

/// Derives the signature describing a value's shape.
///
/// Empty arrays and dictionaries carry no element to inspect and render as
/// `as` and `a{sv}`; fixture builders that need a different element type
/// should spell the signature out themselves.
pub fn signature_of(value: &Value) -> String {
    match value {
        Value::U8(_) => "y".into(),
        Value::U16(_) => "q".into(),
        Value::U32(_) => "u".into(),
        Value::U64(_) => "t".into(),
        Value::Bool(_) => "b".into(),
        Value::Str(_) => "s".into(),
        Value::Bytes(_) => "ay".into(),
        Value::Array(items) => match items.first() {
            Some(first) => format!("a{}", signature_of(first)),
            None => "as".into(),
        },
        Value::Dict(entries) => match entries.first() {
            Some((key, val)) => format!("a{{{}{}}}", signature_of(key), signature_of(val)),
            None => "a{sv}".into(),
        },
        Value::Tuple(members) => {
            let mut out = String::from("(");
            for member in members {
                out.push_str(&signature_of(member));
            }
            out.push(')');
            out
        }
        Value::Variant { .. } => "v".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_bytes_are_zero() {
        let buf = encode(
            &Value::Tuple(vec![Value::U8(0xff), Value::U32(0xffff_ffff)]),
            Endian::Little,
        );
        assert_eq!(buf[1..4], [0, 0, 0]);
    }

    #[test]
    fn test_signature_of_nested() {
        let value = Value::Tuple(vec![
            Value::Array(vec![Value::Tuple(vec![
                Value::Str("n".into()),
                Value::Bytes(vec![1]),
            ])]),
            Value::Dict(vec![(
                Value::Str("k".into()),
                Value::Variant {
                    signature: "t".into(),
                    value: Box::new(Value::U64(1)),
                },
            )]),
        ]);
        assert_eq!(signature_of(&value), "(a(say)a{sv})");
    }

    #[test]
    fn test_variant_frame_layout() {
        let buf = encode(
            &Value::Variant {
                signature: "y".into(),
                value: Box::new(Value::U8(9)),
            },
            Endian::Little,
        );
        // 4-byte length, then value byte, NUL, signature.
        assert_eq!(buf, [3, 0, 0, 0, 9, 0, b'y']);
    }
}
