//! Tagged binary container format for ostmeta.
//!
//! The repository's summary and metadata objects are serialized in a compact
//! binary container format: aligned fixed-width scalars, length-prefixed
//! strings and arrays, count-prefixed dictionaries, and framed variants that
//! carry their own type signature. This crate implements the format with no
//! repository semantics:
//!
//! - [`Type`] parses signature strings like `(a(s(ayv))a{sv})`
//! - [`Reader`]/[`decode`] turn bytes into [`Value`] trees, bounds-checked
//! - [`Writer`]/[`encode`] mirror the reader for fixtures and fuzz seeds

pub mod error;
pub mod reader;
pub mod signature;
pub mod writer;

pub use error::{Result, VariantError};
pub use reader::{decode, Endian, Reader, Value};
pub use signature::Type;
pub use writer::{encode, signature_of, Writer};
