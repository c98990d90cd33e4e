//! Type signatures for the container format.
//!
//! A signature is an ASCII string describing a serialized type:
//!
//! | code      | type                                  |
//! |-----------|---------------------------------------|
//! | `y`       | u8                                    |
//! | `q`       | u16                                   |
//! | `u`       | u32                                   |
//! | `t`       | u64                                   |
//! | `b`       | bool (one byte)                       |
//! | `s`       | UTF-8 string, u32 length prefix       |
//! | `ay`      | raw byte array, u32 length prefix     |
//! | `aT`      | array of `T`, u32 count prefix        |
//! | `a{KV}`   | dictionary, u32 entry count prefix    |
//! | `(T...)`  | tuple, members in order               |
//! | `v`       | framed variant with trailing signature|

use crate::{Result, VariantError};

/// A parsed type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    U8,
    U16,
    U32,
    U64,
    Bool,
    Str,
    /// `ay`, kept distinct from `Array(U8)` so byte payloads decode as one blob.
    Bytes,
    Array(Box<Type>),
    Dict(Box<Type>, Box<Type>),
    Tuple(Vec<Type>),
    Variant,
}

impl Type {
    /// Parses a complete signature string into a single type.
    ///
    /// Fails if the signature is empty, malformed, or describes more than
    /// one top-level type.
    pub fn parse(signature: &str) -> Result<Self> {
        let mut parser = SigParser {
            sig: signature.as_bytes(),
            pos: 0,
        };
        let ty = parser.next_type(signature)?;
        if parser.pos != parser.sig.len() {
            return Err(VariantError::Signature(format!(
                "trailing characters in signature {signature:?}"
            )));
        }
        Ok(ty)
    }

    /// Renders the type back into its signature string.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }

    fn render(&self, out: &mut String) {
        match self {
            Self::U8 => out.push('y'),
            Self::U16 => out.push('q'),
            Self::U32 => out.push('u'),
            Self::U64 => out.push('t'),
            Self::Bool => out.push('b'),
            Self::Str => out.push('s'),
            Self::Bytes => out.push_str("ay"),
            Self::Array(elem) => {
                out.push('a');
                elem.render(out);
            }
            Self::Dict(key, value) => {
                out.push_str("a{");
                key.render(out);
                value.render(out);
                out.push('}');
            }
            Self::Tuple(members) => {
                out.push('(');
                for member in members {
                    member.render(out);
                }
                out.push(')');
            }
            Self::Variant => out.push('v'),
        }
    }
}

struct SigParser<'a> {
    sig: &'a [u8],
    pos: usize,
}

impl SigParser<'_> {
    fn next_type(&mut self, full: &str) -> Result<Type> {
        let code = self.next_byte(full)?;
        match code {
            b'y' => Ok(Type::U8),
            b'q' => Ok(Type::U16),
            b'u' => Ok(Type::U32),
            b't' => Ok(Type::U64),
            b'b' => Ok(Type::Bool),
            b's' => Ok(Type::Str),
            b'v' => Ok(Type::Variant),
            b'a' => match self.peek() {
                Some(b'y') => {
                    self.pos += 1;
                    Ok(Type::Bytes)
                }
                Some(b'{') => {
                    self.pos += 1;
                    let key = self.next_type(full)?;
                    let value = self.next_type(full)?;
                    if self.next_byte(full)? != b'}' {
                        return Err(VariantError::Signature(format!(
                            "unterminated dictionary in {full:?}"
                        )));
                    }
                    Ok(Type::Dict(Box::new(key), Box::new(value)))
                }
                Some(_) => Ok(Type::Array(Box::new(self.next_type(full)?))),
                None => Err(VariantError::Signature(format!(
                    "dangling array in {full:?}"
                ))),
            },
            b'(' => {
                let mut members = Vec::new();
                loop {
                    if self.peek() == Some(b')') {
                        self.pos += 1;
                        return Ok(Type::Tuple(members));
                    }
                    members.push(self.next_type(full)?);
                }
            }
            other => Err(VariantError::Signature(format!(
                "unknown type code {:?} in {full:?}",
                other as char
            ))),
        }
    }

    fn next_byte(&mut self, full: &str) -> Result<u8> {
        let byte = self
            .peek()
            .ok_or_else(|| VariantError::Signature(format!("unexpected end of {full:?}")))?;
        self.pos += 1;
        Ok(byte)
    }

    fn peek(&self) -> Option<u8> {
        self.sig.get(self.pos).copied()
    }
}
