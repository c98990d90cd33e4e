//! The export pipeline.
//!
//! One summary fetch enumerates every ref; each selected ref then runs
//! {load commit → read metadata → convert → read manifest → canonicalize}
//! on a bounded worker pool. Results land in slots indexed by enumeration
//! position, so output order never depends on completion order, and one
//! ref's failure never blocks another's.

use crate::filter::{is_built_extension, RefParts};
use crate::manifest;
use crate::record::{ExportReport, ResultRecord, SkipReason, SkippedRef};
use crate::{ExportConfig, ExportError, Result};
use ostmeta_repo::{decode_summary, ObjectStoreClient, RefEntry, TreeWalker};
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Store path of the packaging metadata keyfile.
pub const METADATA_PATH: &str = "metadata";

/// Store path of the embedded build manifest.
pub const MANIFEST_PATH: &str = "app/manifest.json";

/// Runs a full export against the configured repository.
///
/// `shutdown` cancels the run: in-flight refs stop at their next suspension
/// point and [`ExportError::Cancelled`] is returned. A receiver whose sender
/// never fires (or was dropped) leaves the run unconstrained.
pub async fn export(
    config: ExportConfig,
    mut shutdown: watch::Receiver<()>,
) -> Result<ExportReport> {
    let client = Arc::new(ObjectStoreClient::new(config.client.clone())?);

    info!(url = %client.base_url(), "fetching summary");
    let summary_bytes = tokio::select! {
        _ = cancelled(&mut shutdown) => return Err(ExportError::Cancelled),
        fetched = client.fetch_summary() => fetched?,
    };
    let entries = decode_summary(&summary_bytes)?;
    let refs_enumerated = entries.len();
    let selected: Vec<RefEntry> = entries
        .into_iter()
        .filter(|entry| config.filter.matches(&entry.name))
        .collect();
    info!(
        enumerated = refs_enumerated,
        selected = selected.len(),
        concurrency = config.concurrency,
        "enumerated refs"
    );

    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut join_set: JoinSet<(usize, Option<std::result::Result<ResultRecord, SkipReason>>)> =
        JoinSet::new();
    for (index, entry) in selected.iter().cloned().enumerate() {
        let client = Arc::clone(&client);
        let semaphore = Arc::clone(&semaphore);
        let mut shutdown = shutdown.clone();
        let fetch_manifests = config.fetch_manifests;
        join_set.spawn(async move {
            let outcome = tokio::select! {
                _ = cancelled(&mut shutdown) => None,
                outcome = async {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .expect("semaphore is never closed");
                    process_ref(&client, &entry, fetch_manifests).await
                } => Some(outcome),
            };
            (index, outcome)
        });
    }

    // Slots indexed by enumeration position, not completion order.
    let mut slots: Vec<Option<std::result::Result<ResultRecord, SkipReason>>> =
        selected.iter().map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = outcome,
            Err(join_error) if join_error.is_panic() => {
                error!(error = %join_error, "ref worker panicked");
            }
            Err(_) => {}
        }
    }

    if shutdown.has_changed().unwrap_or(false) {
        return Err(ExportError::Cancelled);
    }

    let mut report = ExportReport {
        refs_enumerated,
        ..Default::default()
    };
    for (entry, slot) in selected.into_iter().zip(slots) {
        match slot {
            Some(Ok(record)) => report.records.push(record),
            Some(Err(reason)) => {
                warn!(ref_name = %entry.name, %reason, "skipping ref");
                report.skipped.push(SkippedRef {
                    ref_name: entry.name,
                    reason,
                });
            }
            // Only a panicked worker leaves a slot empty; already logged.
            None => {}
        }
    }
    info!(
        exported = report.records.len(),
        skipped = report.skipped.len(),
        "export finished"
    );
    Ok(report)
}

/// One ref's pipeline. Every failure is folded into a [`SkipReason`] at
/// this boundary so the orchestrator can keep going.
async fn process_ref(
    client: &ObjectStoreClient,
    entry: &RefEntry,
    fetch_manifests: bool,
) -> std::result::Result<ResultRecord, SkipReason> {
    let walker = TreeWalker::new(client);
    let commit = walker.load_commit(&entry.checksum).await?;

    let metadata_bytes = walker
        .read_file(&commit.root_tree, METADATA_PATH)
        .await?
        .ok_or(SkipReason::MetadataMissing)?;
    let metadata_text =
        std::str::from_utf8(&metadata_bytes).map_err(|_| SkipReason::MetadataNotUtf8)?;
    let metadata = ostmeta_keyfile::to_json(metadata_text)?;

    // Build byproducts never embed a manifest; skip the round-trip.
    let want_manifest = fetch_manifests
        && !RefParts::parse(&entry.name).is_some_and(|parts| is_built_extension(parts.id));
    let manifest = if want_manifest {
        match walker.read_file(&commit.root_tree, MANIFEST_PATH).await? {
            Some(bytes) => match manifest::parse_and_canonicalize(&bytes) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(ref_name = %entry.name, error = %e, "manifest is not valid JSON, omitting");
                    None
                }
            },
            None => None,
        }
    } else {
        None
    };

    debug!(ref_name = %entry.name, manifest = manifest.is_some(), "ref exported");
    Ok(ResultRecord {
        ref_name: entry.name.clone(),
        metadata,
        manifest,
    })
}

/// Resolves when the shutdown signal fires. A dropped sender means
/// cancellation can no longer arrive, so the future parks instead.
async fn cancelled(shutdown: &mut watch::Receiver<()>) {
    if shutdown.changed().await.is_err() {
        std::future::pending::<()>().await;
    }
}
