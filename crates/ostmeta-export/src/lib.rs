//! # ostmeta export orchestration
//!
//! Ties the repository reader and the keyfile converter into one pipeline:
//! enumerate refs from the summary, filter, walk each ref's object graph to
//! its `metadata` file and (when present) its embedded `app/manifest.json`,
//! and collect one JSON record per ref in enumeration order.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ostmeta_export::{export, ExportConfig};
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ExportConfig::new("https://repo.example.com/stable".parse()?);
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(());
//!     let report = export(config, shutdown_rx).await?;
//!     serde_json::to_writer_pretty(std::io::stdout(), &report.records)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod manifest;
pub mod record;
pub mod run;

pub use config::{ExportConfig, DEFAULT_CONCURRENCY};
pub use error::{ExportError, Result};
pub use filter::{is_built_extension, RefFilter, RefParts};
pub use manifest::{canonicalize, parse_and_canonicalize};
pub use record::{ExportReport, ResultRecord, SkipReason, SkippedRef};
pub use run::{export, MANIFEST_PATH, METADATA_PATH};
