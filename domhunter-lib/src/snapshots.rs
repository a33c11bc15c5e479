//! Snapshot merger: one listing per URL variant, merged into a single
//! deduplicated, newest-first list.

use crate::providers::ArchiveProvider;
use crate::types::SnapshotItem;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Base URLs queried for a domain: http/https, bare and optionally `www.`.
pub fn snapshot_variants(domain: &str, include_www: bool) -> Vec<String> {
    let mut variants = vec![
        format!("http://{}/", domain),
        format!("https://{}/", domain),
    ];
    if include_www && !domain.starts_with("www.") {
        variants.push(format!("http://www.{}/", domain));
        variants.push(format!("https://www.{}/", domain));
    }
    variants
}

/// Merge partial listings.
///
/// Items are deduplicated on `(timestamp, original_url)` and sorted by
/// timestamp, newest first; equal timestamps are ordered by original URL so
/// the result does not depend on which listing arrived first. At most
/// `limit` items are kept.
pub fn merge_snapshots<I>(partials: I, limit: usize) -> Vec<SnapshotItem>
where
    I: IntoIterator<Item = Vec<SnapshotItem>>,
{
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut merged: Vec<SnapshotItem> = Vec::new();

    for item in partials.into_iter().flatten() {
        let key = (item.timestamp.clone(), item.original_url.clone());
        if seen.insert(key) {
            merged.push(item);
        }
    }

    merged.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.original_url.cmp(&b.original_url))
    });
    merged.truncate(limit);
    merged
}

/// Query every variant of `domain` concurrently and merge the results.
///
/// A failed variant is logged and dropped; if all of them fail the result is
/// simply empty.
pub async fn collect_snapshots(
    archive: &dyn ArchiveProvider,
    domain: &str,
    limit: usize,
    include_www: bool,
) -> Vec<SnapshotItem> {
    let variants = snapshot_variants(domain, include_www);

    let listings = join_all(
        variants
            .iter()
            .map(|base_url| archive.list_snapshots(base_url, limit)),
    )
    .await;

    let partials: Vec<Vec<SnapshotItem>> = variants
        .iter()
        .zip(listings)
        .filter_map(|(base_url, listing)| match listing {
            Ok(items) => Some(items),
            Err(e) => {
                warn!(domain, base_url = %base_url, error = %e, "snapshot variant failed");
                None
            }
        })
        .collect();

    let merged = merge_snapshots(partials, limit);
    debug!(domain, count = merged.len(), "snapshots merged");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(ts: &str, url: &str) -> SnapshotItem {
        SnapshotItem::new(ts, url)
    }

    #[test]
    fn test_snapshot_variants() {
        assert_eq!(
            snapshot_variants("example.com", true),
            vec![
                "http://example.com/",
                "https://example.com/",
                "http://www.example.com/",
                "https://www.example.com/",
            ]
        );
        assert_eq!(snapshot_variants("example.com", false).len(), 2);
        // No www.www. variants
        assert_eq!(snapshot_variants("www.example.com", true).len(), 2);
    }

    #[test]
    fn test_merge_dedupes_across_variants() {
        let http = vec![
            item("20200101000000", "http://example.com:80/"),
            item("20210101000000", "http://example.com/"),
        ];
        let https = vec![
            item("20200101000000", "http://example.com/"),
            item("20220101000000", "https://example.com/"),
        ];

        let merged = merge_snapshots(vec![http, https], 10);
        assert_eq!(
            merged,
            vec![
                item("20220101000000", "https://example.com/"),
                item("20210101000000", "http://example.com/"),
                item("20200101000000", "http://example.com/"),
            ]
        );
    }

    #[test]
    fn test_merge_independent_of_arrival_order() {
        let a = vec![
            item("20200101000000", "https://www.example.com/"),
            item("20190101000000", "http://example.com/"),
        ];
        let b = vec![
            item("20200101000000", "http://example.com/"),
            item("20190101000000", "http://example.com/"),
        ];

        let forward = merge_snapshots(vec![a.clone(), b.clone()], 10);
        let backward = merge_snapshots(vec![b, a], 10);
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 3);
        assert_eq!(forward[0].original_url, "http://example.com/");
        assert_eq!(forward[1].original_url, "https://www.example.com/");
    }

    #[test]
    fn test_merge_truncates_after_sorting() {
        let partial = vec![
            item("20100101000000", "http://example.com/"),
            item("20230101000000", "http://example.com/"),
            item("20150101000000", "http://example.com/"),
        ];

        let merged = merge_snapshots(vec![partial], 2);
        let timestamps: Vec<&str> = merged.iter().map(|s| s.timestamp.as_str()).collect();
        assert_eq!(timestamps, vec!["20230101000000", "20150101000000"]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_snapshots(Vec::<Vec<SnapshotItem>>::new(), 5).is_empty());
    }
}
