//! Core data types for the domain enrichment pipeline.
//!
//! This module defines the per-domain result record, the tri-state provider
//! answers, archived snapshot identities, and the run configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Registrar answer for a domain.
///
/// Serialized as `true` / `false` / `null` so the output keeps the shape of a
/// nullable boolean, while in code `Unknown` can never be confused with a
/// definitive negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Availability {
    /// Domain can be registered
    Available,
    /// Domain is registered by someone
    Unavailable,
    /// Provider could not give a definitive answer
    #[default]
    Unknown,
}

/// Search engine answer for a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Indexation {
    /// At least one page under the domain is indexed
    Indexed,
    /// The index holds no page for the domain
    NotIndexed,
    /// Quota/auth failure or any other error
    #[default]
    Unknown,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn as_option(&self) -> Option<bool> {
        (*self).into()
    }
}

impl Indexation {
    pub fn is_indexed(&self) -> bool {
        matches!(self, Indexation::Indexed)
    }

    pub fn as_option(&self) -> Option<bool> {
        (*self).into()
    }
}

impl From<Option<bool>> for Availability {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Availability::Available,
            Some(false) => Availability::Unavailable,
            None => Availability::Unknown,
        }
    }
}

impl From<Availability> for Option<bool> {
    fn from(value: Availability) -> Self {
        match value {
            Availability::Available => Some(true),
            Availability::Unavailable => Some(false),
            Availability::Unknown => None,
        }
    }
}

impl From<Option<bool>> for Indexation {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Indexation::Indexed,
            Some(false) => Indexation::NotIndexed,
            None => Indexation::Unknown,
        }
    }
}

impl From<Indexation> for Option<bool> {
    fn from(value: Indexation) -> Self {
        match value {
            Indexation::Indexed => Some(true),
            Indexation::NotIndexed => Some(false),
            Indexation::Unknown => None,
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available => write!(f, "true"),
            Availability::Unavailable => write!(f, "false"),
            Availability::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::fmt::Display for Indexation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Indexation::Indexed => write!(f, "true"),
            Indexation::NotIndexed => write!(f, "false"),
            Indexation::Unknown => write!(f, "unknown"),
        }
    }
}

/// Enrichment record for one input domain.
///
/// Owned by exactly one processing task until the check chain terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainResult {
    /// The normalized domain name (e.g., "example.com")
    pub domain: String,

    /// Registrar availability
    pub available: Availability,

    /// Search indexation; only resolved when the domain is available
    pub indexed: Indexation,

    /// Number of archived HTML pages written to disk
    pub archived_page_count: usize,

    /// Diagnostic text accumulated during processing
    pub notes: String,
}

impl DomainResult {
    /// Fresh record with every later field at its default.
    pub fn new<D: Into<String>>(domain: D) -> Self {
        Self {
            domain: domain.into(),
            available: Availability::Unknown,
            indexed: Indexation::Unknown,
            archived_page_count: 0,
            notes: String::new(),
        }
    }

    /// Append diagnostic text; earlier notes are never overwritten.
    pub fn append_note<N: AsRef<str>>(&mut self, note: N) {
        let note = note.as_ref().trim();
        if note.is_empty() {
            return;
        }
        if !self.notes.is_empty() {
            self.notes.push_str("; ");
        }
        self.notes.push_str(note);
    }
}

/// One distinct archived capture.
///
/// Identity is the `(timestamp, original_url)` pair. Timestamps are 14-digit
/// `YYYYMMDDhhmmss` tokens, so string order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub timestamp: String,
    #[serde(rename = "original")]
    pub original_url: String,
}

impl SnapshotItem {
    /// Build an item, normalizing the original URL.
    pub fn new<T: Into<String>>(timestamp: T, original_url: &str) -> Self {
        Self {
            timestamp: timestamp.into(),
            original_url: normalize_original_url(original_url),
        }
    }

    /// Replay URL of this capture under the given archive base
    /// (e.g. `https://web.archive.org/web`).
    pub fn archive_url(&self, archive_base: &str) -> String {
        format!(
            "{}/{}/{}",
            archive_base.trim_end_matches('/'),
            self.timestamp,
            self.original_url
        )
    }

    /// File name the capture is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.timestamp)
    }
}

/// Whether a token is a full capture timestamp (`YYYYMMDDhhmmss`).
pub fn is_capture_timestamp(token: &str) -> bool {
    token.len() == 14 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Strip the default port from an archived URL's authority.
///
/// The archive sometimes reports `http://example.com:80/`; that capture is the
/// same page as `http://example.com/` and must share its identity key.
pub fn normalize_original_url(original: &str) -> String {
    let original = original.trim();
    let (scheme, default_port) = if original.starts_with("http://") {
        ("http://", ":80")
    } else if original.starts_with("https://") {
        ("https://", ":443")
    } else {
        return original.to_string();
    };

    let rest = &original[scheme.len()..];
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);

    match authority.strip_suffix(default_port) {
        Some(host) => format!("{}{}{}", scheme, host, tail),
        None => original.to_string(),
    }
}

/// Raw outcome of fetching one archived page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Only HTTP 200 with an HTML content type counts as a saved page.
    pub fn is_html_success(&self) -> bool {
        self.status == 200 && self.content_type.to_ascii_lowercase().contains("text/html")
    }
}

/// Configuration options for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuntConfig {
    /// Maximum number of domain pipelines in flight
    /// Default: 5, Range: 1-100
    pub concurrency: usize,

    /// Archived pages to download per domain
    /// Default: 5
    pub max_archives: usize,

    /// Snapshots to keep per URL variant and after merging
    /// Default: 50
    pub snapshot_limit: usize,

    /// Also query `www.`-prefixed variants
    /// Default: true
    pub include_www_variants: bool,

    /// Ask the availability API for the newest capture of each variant
    /// Default: true
    pub include_latest_capture: bool,

    /// Timeout for provider API requests
    /// Default: 30 seconds
    #[serde(skip)]
    pub request_timeout: Duration,

    /// Timeout for each archived page download
    /// Default: 45 seconds
    #[serde(skip)]
    pub download_timeout: Duration,

    /// Pause between two downloads of the same domain
    /// Default: 300 milliseconds
    #[serde(skip)]
    pub download_delay: Duration,

    /// Re-download pages already present on disk
    /// Default: false
    pub overwrite: bool,

    /// User agent sent to every provider
    pub user_agent: String,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            max_archives: 5,
            snapshot_limit: 50,
            include_www_variants: true,
            include_latest_capture: true,
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(45),
            download_delay: Duration::from_millis(300),
            overwrite: false,
            user_agent: format!("domhunter/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HuntConfig {
    /// Set concurrency, capped to 1..=100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    pub fn with_max_archives(mut self, max_archives: usize) -> Self {
        self.max_archives = max_archives;
        self
    }

    /// Set the snapshot limit; zero is bumped to one.
    pub fn with_snapshot_limit(mut self, limit: usize) -> Self {
        self.snapshot_limit = limit.max(1);
        self
    }

    pub fn with_www_variants(mut self, enabled: bool) -> Self {
        self.include_www_variants = enabled;
        self
    }

    pub fn with_latest_capture(mut self, enabled: bool) -> Self {
        self.include_latest_capture = enabled;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = delay;
        self
    }

    pub fn with_overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    pub fn with_user_agent<U: Into<String>>(mut self, user_agent: U) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
