//! Archived HTML downloads and the per-domain manifest.

use crate::error::HuntError;
use crate::providers::ArchiveProvider;
use crate::types::{HuntConfig, SnapshotItem};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Name of the manifest written next to the downloaded pages.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One attempted download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub timestamp: String,
    pub original: String,
    pub archive_url: String,

    /// File name when the page was written, `null` otherwise
    pub saved: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ManifestEntry {
    fn for_snapshot(snapshot: &SnapshotItem, archive_url: String) -> Self {
        Self {
            timestamp: snapshot.timestamp.clone(),
            original: snapshot.original_url.clone(),
            archive_url,
            saved: None,
            status: None,
            content_type: None,
            error: None,
            skipped: false,
            reason: None,
        }
    }
}

/// What a domain's archive stage produced.
#[derive(Debug, Clone, Default)]
pub struct ArchiveOutcome {
    /// Pages written during this run
    pub saved: usize,
    pub manifest: Vec<ManifestEntry>,
}

/// Download up to `config.max_archives` snapshots into `domain_dir`.
///
/// Per-item failures end up in the manifest. Only failures to create the
/// directory or write the manifest are returned as errors.
pub async fn download_archives(
    archive: &dyn ArchiveProvider,
    snapshots: &[SnapshotItem],
    domain_dir: &Path,
    config: &HuntConfig,
) -> Result<ArchiveOutcome, HuntError> {
    tokio::fs::create_dir_all(domain_dir).await.map_err(|e| {
        HuntError::file_error(
            domain_dir.to_string_lossy(),
            format!("Failed to create archive directory: {}", e),
        )
    })?;

    let subset = &snapshots[..snapshots.len().min(config.max_archives)];
    let total = subset.len();
    let mut outcome = ArchiveOutcome::default();

    info!(dir = %domain_dir.display(), count = total, "downloading archived pages");

    for (idx, snapshot) in subset.iter().enumerate() {
        let archive_url = archive.archive_url(snapshot);
        let file_name = snapshot.file_name();
        let target = domain_dir.join(&file_name);
        let mut entry = ManifestEntry::for_snapshot(snapshot, archive_url);

        if !config.overwrite && tokio::fs::try_exists(&target).await.unwrap_or(false) {
            debug!("[{}/{}] {} already present, skipped", idx + 1, total, file_name);
            entry.saved = Some(file_name);
            entry.skipped = true;
            entry.reason = Some("exists".to_string());
            outcome.manifest.push(entry);
            continue;
        }

        match archive.download_page(snapshot).await {
            Ok(page) => {
                entry.status = Some(page.status);
                entry.content_type = Some(page.content_type.clone());

                if page.is_html_success() {
                    match tokio::fs::write(&target, &page.body).await {
                        Ok(()) => {
                            entry.saved = Some(file_name);
                            outcome.saved += 1;
                        }
                        Err(e) => entry.error = Some(format!("write failed: {}", e)),
                    }
                }
            }
            Err(e) => {
                debug!("[{}/{}] {} failed: {}", idx + 1, total, entry.archive_url, e);
                entry.error = Some(e.to_string());
            }
        }
        outcome.manifest.push(entry);

        if !config.download_delay.is_zero() && idx + 1 < total {
            tokio::time::sleep(config.download_delay).await;
        }
    }

    if !outcome.manifest.is_empty() {
        let manifest_path = domain_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&outcome.manifest)?;
        tokio::fs::write(&manifest_path, json).await.map_err(|e| {
            HuntError::file_error(
                manifest_path.to_string_lossy(),
                format!("Failed to write manifest: {}", e),
            )
        })?;
    }

    info!(dir = %domain_dir.display(), saved = outcome.saved, "archived pages saved");
    Ok(outcome)
}
