//! HTTP retrieval of content-addressed objects.
//!
//! This is the only layer that retries: transient transport failures and
//! 5xx responses are retried with capped exponential backoff, 404 is the
//! normal not-found outcome, and decode failures above this layer are never
//! retried.

use crate::checksum::Checksum;
use crate::object::{relative_path, ObjectKind, COMPRESSED_FILE_SUFFIX};
use crate::{RepoError, Result};
use bytes::Bytes;
use flate2::read::ZlibDecoder;
use reqwest::StatusCode;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Configuration for the object store client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Repository root URL; a trailing slash is added if missing.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Additional attempts after the first transient failure.
    pub max_retries: u32,
    /// First backoff delay; doubles per attempt.
    pub backoff_base: Duration,
}

impl ClientConfig {
    /// Creates a configuration with default timeout and retry policy.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_base: Duration::from_millis(500),
        }
    }
}

enum FetchFailure {
    Transient(String),
    Permanent(String),
}

/// Client for one remote repository's object store.
pub struct ObjectStoreClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ObjectStoreClient {
    /// Creates a client with its own connection pool.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ostmeta/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// The repository root this client reads from.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Fetches the summary document. Its absence is fatal: without a
    /// summary there is nothing to enumerate.
    pub async fn fetch_summary(&self) -> Result<Bytes> {
        let url = self.join("summary")?;
        match self.get_with_retry(&url).await? {
            Some(bytes) => Ok(bytes),
            None => Err(RepoError::SummaryUnavailable(format!("{url} not found"))),
        }
    }

    /// Fetches one object, returning `Ok(None)` when the store lacks it.
    ///
    /// File content is requested in its compressed representation first,
    /// falling back to the raw object. All fetched content is verified
    /// against the requested checksum.
    pub async fn fetch(&self, checksum: &Checksum, kind: ObjectKind) -> Result<Option<Bytes>> {
        if kind == ObjectKind::File {
            let url = self.join(&relative_path(checksum, COMPRESSED_FILE_SUFFIX))?;
            if let Some(compressed) = self.get_with_retry(&url).await? {
                let content = inflate(&compressed).map_err(|e| RepoError::ObjectDecode {
                    kind,
                    checksum: *checksum,
                    reason: format!("decompression failed: {e}"),
                })?;
                let content = Bytes::from(content);
                self.verify(checksum, &content)?;
                return Ok(Some(content));
            }
        }
        let url = self.join(&relative_path(checksum, kind.suffix()))?;
        match self.get_with_retry(&url).await? {
            Some(bytes) => {
                self.verify(checksum, &bytes)?;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    fn verify(&self, expected: &Checksum, content: &[u8]) -> Result<()> {
        let actual = Checksum::digest(content);
        if actual != *expected {
            return Err(RepoError::Corruption {
                expected: *expected,
                actual,
            });
        }
        Ok(())
    }

    fn join(&self, relative: &str) -> Result<Url> {
        self.config.base_url.join(relative).map_err(|e| RepoError::Fetch {
            url: format!("{}{relative}", self.config.base_url),
            reason: e.to_string(),
        })
    }

    async fn get_with_retry(&self, url: &Url) -> Result<Option<Bytes>> {
        let mut attempt = 0u32;
        loop {
            match self.get_once(url).await {
                Ok(found) => return Ok(found),
                Err(FetchFailure::Transient(reason)) if attempt < self.config.max_retries => {
                    let delay = self.config.backoff_base * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    debug!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient fetch failure, retrying: {reason}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(FetchFailure::Transient(reason)) => {
                    return Err(RepoError::Fetch {
                        url: url.to_string(),
                        reason: format!("retry budget exhausted: {reason}"),
                    });
                }
                Err(FetchFailure::Permanent(reason)) => {
                    return Err(RepoError::Fetch {
                        url: url.to_string(),
                        reason,
                    });
                }
            }
        }
    }

    async fn get_once(&self, url: &Url) -> std::result::Result<Option<Bytes>, FetchFailure> {
        trace!(url = %url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchFailure::Transient(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status.is_server_error() {
            return Err(FetchFailure::Transient(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(FetchFailure::Permanent(format!("HTTP {status}")));
        }
        response
            .bytes()
            .await
            .map(Some)
            .map_err(|e| FetchFailure::Transient(e.to_string()))
    }
}

fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut content = Vec::new();
    decoder.read_to_end(&mut content)?;
    Ok(content)
}
