//! Per-domain check chain.
//!
//! availability → indexation → archive retrieval, stopping at the first
//! answer that is not a definite yes.

use crate::archive::download_archives;
use crate::concurrent::ConcurrencyGate;
use crate::error::HuntError;
use crate::providers::Providers;
use crate::snapshots::collect_snapshots;
use crate::types::{Availability, DomainResult, HuntConfig, Indexation};
use std::path::Path;
use tracing::{debug, info, warn};

/// Run the full chain for one normalized domain.
///
/// Holds one gate slot for the whole chain. Never fails: provider problems
/// are already `Unknown`, and archive-stage errors land in `notes`.
pub async fn process_domain(
    domain: &str,
    providers: &Providers,
    config: &HuntConfig,
    archive_root: &Path,
    gate: &ConcurrencyGate,
) -> DomainResult {
    let mut result = DomainResult::new(domain);

    let _permit = match gate.acquire().await {
        Ok(permit) => permit,
        Err(e) => {
            result.append_note(e.to_string());
            return result;
        }
    };

    result.available = providers.availability.check_availability(domain).await;
    if result.available != Availability::Available {
        debug!(domain, available = %result.available, "stopping after availability");
        return result;
    }

    result.indexed = providers.index.check_indexed(domain).await;
    if result.indexed != Indexation::Indexed {
        debug!(domain, indexed = %result.indexed, "stopping after indexation");
        return result;
    }

    match archive_stage(domain, providers, config, archive_root).await {
        Ok(saved) => result.archived_page_count = saved,
        Err(e) => {
            warn!(domain, error = %e, "archive stage failed");
            result.append_note(format!("Wayback error: {}", e));
        }
    }

    info!(
        domain,
        archived = result.archived_page_count,
        "domain processed"
    );
    result
}

async fn archive_stage(
    domain: &str,
    providers: &Providers,
    config: &HuntConfig,
    archive_root: &Path,
) -> Result<usize, HuntError> {
    let snapshots = collect_snapshots(
        providers.archive.as_ref(),
        domain,
        config.snapshot_limit,
        config.include_www_variants,
    )
    .await;

    if snapshots.is_empty() {
        debug!(domain, "no snapshots");
        return Ok(0);
    }

    let domain_dir = archive_root.join(domain);
    let outcome = download_archives(
        providers.archive.as_ref(),
        &snapshots,
        &domain_dir,
        config,
    )
    .await?;

    Ok(outcome.saved)
}
