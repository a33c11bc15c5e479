//! Provider clients for the three external services.
//!
//! Each service sits behind a trait so the pipeline can run against fake
//! providers. The HTTP implementations share one `reqwest::Client`, and
//! with it one connection pool, for the whole run.

/// Registrar availability (Internet.bs)
pub mod internetbs;

/// Search indexation (Google Custom Search)
pub mod google_cse;

/// Web archive listing and replay (Wayback Machine)
pub mod wayback;

use crate::config::Credentials;
use crate::error::HuntError;
use crate::types::{Availability, FetchedPage, HuntConfig, Indexation, SnapshotItem};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use google_cse::GoogleCseClient;
pub use internetbs::InternetBsClient;
pub use wayback::WaybackClient;

/// Answers whether a domain can be registered.
///
/// Never fails: every transport, parse or ambiguity problem is `Unknown`.
#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    async fn check_availability(&self, domain: &str) -> Availability;
}

/// Answers whether a search engine indexes any page of a domain.
///
/// Never fails: quota, auth and every other problem is `Unknown`.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    async fn check_indexed(&self, domain: &str) -> Indexation;
}

/// Lists and replays archived captures.
#[async_trait]
pub trait ArchiveProvider: Send + Sync {
    /// Captures of one base URL (e.g. `https://www.example.com/`), at most `limit`.
    async fn list_snapshots(
        &self,
        base_url: &str,
        limit: usize,
    ) -> Result<Vec<SnapshotItem>, HuntError>;

    /// Fetch the archived body of one capture.
    async fn download_page(&self, snapshot: &SnapshotItem) -> Result<FetchedPage, HuntError>;

    /// Replay URL recorded in manifests for a capture.
    fn archive_url(&self, snapshot: &SnapshotItem) -> String;
}

/// The three providers a domain pipeline talks to.
#[derive(Clone)]
pub struct Providers {
    pub availability: Arc<dyn AvailabilityProvider>,
    pub index: Arc<dyn IndexProvider>,
    pub archive: Arc<dyn ArchiveProvider>,
}

impl Providers {
    /// Bundle explicit provider implementations.
    pub fn new(
        availability: Arc<dyn AvailabilityProvider>,
        index: Arc<dyn IndexProvider>,
        archive: Arc<dyn ArchiveProvider>,
    ) -> Self {
        Self {
            availability,
            index,
            archive,
        }
    }

    /// Build the real HTTP providers over one shared client.
    pub fn from_credentials(
        credentials: &Credentials,
        config: &HuntConfig,
    ) -> Result<Self, HuntError> {
        let http = build_http_client(config)?;

        let availability = InternetBsClient::new(
            http.clone(),
            &credentials.internetbs_api_key,
            &credentials.internetbs_password,
            config.request_timeout,
        );
        let index = GoogleCseClient::new(
            http.clone(),
            &credentials.google_api_key,
            &credentials.google_cx,
            config.request_timeout,
        );
        let archive = WaybackClient::new(http, config);

        Ok(Self::new(
            Arc::new(availability),
            Arc::new(index),
            Arc::new(archive),
        ))
    }
}

/// Create the HTTP client shared by every provider of a run.
pub fn build_http_client(config: &HuntConfig) -> Result<reqwest::Client, HuntError> {
    let pool_size = config.concurrency.max(1) * 2;

    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(pool_size)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| HuntError::network_with_source("Failed to create HTTP client", e.to_string()))
}
