//! Keyfile-to-JSON conversion for ostmeta.
//!
//! Application refs carry a `metadata` file in a line-oriented
//! section/key/value grammar. This crate converts that text into a JSON
//! object with typed values:
//!
//! - sections and keys preserve first-seen order
//! - `true`/`false` coerce to booleans
//! - declared list keys (and any value with an unescaped `;`) become string
//!   lists, with `\;` and `\\` unescaped
//! - declared integer keys become numbers
//! - `Key[locale]=` variants fold under the base key as a locale-keyed
//!   object, the unsuffixed value under `"C"`

pub mod error;
pub mod parse;
pub mod types;

pub use error::{KeyFileError, Result};
pub use parse::to_json;
pub use types::{declared_kind, ValueKind};
