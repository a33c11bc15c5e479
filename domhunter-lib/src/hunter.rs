//! Batch orchestrator.
//!
//! This module provides the `DomainHunter` struct that fans the domain
//! processor out over a whole input list under one concurrency gate.

use crate::config::Credentials;
use crate::concurrent::ConcurrencyGate;
use crate::error::HuntError;
use crate::processor::process_domain;
use crate::providers::Providers;
use crate::types::{DomainResult, HuntConfig};
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use std::path::{Path, PathBuf};

/// Directory under the output root that holds per-domain archives.
pub const ARCHIVES_DIR: &str = "archives";

/// Runs the enrichment pipeline over batches of domains.
///
/// # Example
///
/// ```rust,no_run
/// use domhunter_lib::{Credentials, DomainHunter, HuntConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let credentials = Credentials::from_env()?;
///     let hunter = DomainHunter::new(&credentials, HuntConfig::default(), "output")?;
///
///     let results = hunter.hunt_domains(&["example.com".to_string()]).await;
///     for result in results {
///         println!("{}: available={}", result.domain, result.available);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DomainHunter {
    config: HuntConfig,
    providers: Providers,
    archive_root: PathBuf,
}

impl DomainHunter {
    /// Create a hunter backed by the real HTTP providers.
    ///
    /// Archives are written below `<out_dir>/archives/`.
    pub fn new<P: AsRef<Path>>(
        credentials: &Credentials,
        config: HuntConfig,
        out_dir: P,
    ) -> Result<Self, HuntError> {
        let providers = Providers::from_credentials(credentials, &config)?;
        Ok(Self::with_providers(
            providers,
            config,
            out_dir.as_ref().join(ARCHIVES_DIR),
        ))
    }

    /// Create a hunter over explicit providers and archive directory.
    pub fn with_providers<P: Into<PathBuf>>(
        providers: Providers,
        config: HuntConfig,
        archive_root: P,
    ) -> Self {
        Self {
            config,
            providers,
            archive_root: archive_root.into(),
        }
    }

    /// Process every domain and return results in input order.
    ///
    /// The caller is expected to pass unique, normalized domains. A single
    /// domain never aborts the batch: failures are contained in its result.
    pub async fn hunt_domains(&self, domains: &[String]) -> Vec<DomainResult> {
        let mut slots: Vec<Option<DomainResult>> = vec![None; domains.len()];

        let mut stream = self.hunt_domains_stream(domains);
        while let Some((index, result)) = stream.next().await {
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .zip(domains)
            .map(|(slot, domain)| slot.unwrap_or_else(|| DomainResult::new(domain.as_str())))
            .collect()
    }

    /// Process every domain, yielding `(input index, result)` as each completes.
    ///
    /// All pipelines are started at once; the shared gate keeps at most
    /// `config.concurrency` of them past the gate at any time.
    pub fn hunt_domains_stream<'a>(
        &'a self,
        domains: &'a [String],
    ) -> impl Stream<Item = (usize, DomainResult)> + 'a {
        let gate = ConcurrencyGate::new(self.config.concurrency);

        domains
            .iter()
            .enumerate()
            .map(move |(index, domain)| {
                let gate = gate.clone();
                async move {
                    let result = process_domain(
                        domain,
                        &self.providers,
                        &self.config,
                        &self.archive_root,
                        &gate,
                    )
                    .await;
                    (index, result)
                }
            })
            .collect::<FuturesUnordered<_>>()
    }

    /// Process a single domain with a private gate.
    pub async fn hunt_domain(&self, domain: &str) -> DomainResult {
        let gate = ConcurrencyGate::new(1);
        process_domain(
            domain,
            &self.providers,
            &self.config,
            &self.archive_root,
            &gate,
        )
        .await
    }

    /// Get the configuration for this hunter.
    pub fn config(&self) -> &HuntConfig {
        &self.config
    }

    /// Directory holding per-domain archive folders.
    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }
}
