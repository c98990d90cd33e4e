//! Export run configuration.
//!
//! Everything an export needs travels in this one explicit object — there
//! is no process-wide repository state.

use crate::filter::RefFilter;
use ostmeta_repo::ClientConfig;
use url::Url;

/// Worker pool size used when the caller does not choose one.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Configuration for one export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Object store client settings, including the repository root URL.
    pub client: ClientConfig,
    /// Which enumerated refs to process.
    pub filter: RefFilter,
    /// Maximum refs in flight at once.
    pub concurrency: usize,
    /// Whether to look for embedded build manifests at all.
    pub fetch_manifests: bool,
}

impl ExportConfig {
    /// Creates a configuration with default filter, concurrency, and
    /// client policy.
    pub fn new(base_url: Url) -> Self {
        Self {
            client: ClientConfig::new(base_url),
            filter: RefFilter::default(),
            concurrency: DEFAULT_CONCURRENCY,
            fetch_manifests: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::new(Url::parse("https://repo.example.com/").unwrap());
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert!(config.fetch_manifests);
        assert!(config.filter.refs.is_none());
    }
}
