//! Wayback Machine client: CDX listing, newest-capture lookup and replay downloads.
//!
//! The CDX server answers `output=json` queries with an array of rows whose
//! first row names the columns. Only HTML captures that were served with
//! status 200 are of interest.

use super::ArchiveProvider;
use crate::error::HuntError;
use crate::types::{is_capture_timestamp, FetchedPage, HuntConfig, SnapshotItem};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const CDX_SEARCH_URL: &str = "https://web.archive.org/cdx/search/cdx";
pub const AVAILABILITY_URL: &str = "https://archive.org/wayback/available";
pub const REPLAY_BASE_URL: &str = "https://web.archive.org/web";

/// Archive client for the Wayback Machine.
#[derive(Clone)]
pub struct WaybackClient {
    http_client: reqwest::Client,
    cdx_endpoint: String,
    availability_endpoint: String,
    replay_base: String,
    request_timeout: Duration,
    download_timeout: Duration,
    include_latest_capture: bool,
}

/// Response of the availability API.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArchivedSnapshots {
    #[serde(default)]
    pub closest: Option<ClosestCapture>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClosestCapture {
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ClosestCapture {
    /// Turn a replay URL (`…/web/<ts>/<original>`) into a snapshot item.
    pub fn to_snapshot(&self) -> Option<SnapshotItem> {
        if !self.available {
            return None;
        }
        if matches!(self.status.as_deref(), Some(code) if code != "200") {
            return None;
        }

        let (_, tail) = self.url.split_once("/web/")?;
        let (ts_part, original) = tail.split_once('/')?;
        let timestamp = if is_capture_timestamp(&self.timestamp) {
            self.timestamp.as_str()
        } else {
            ts_part
        };
        if !is_capture_timestamp(timestamp) || original.is_empty() {
            return None;
        }

        let original = if original.starts_with("http://") || original.starts_with("https://") {
            original.to_string()
        } else {
            format!("https://{}", original)
        };

        Some(SnapshotItem::new(timestamp, &original))
    }
}

/// Parse a CDX `output=json` body into snapshot items.
///
/// Rows with a malformed timestamp, a non-200 status or a non-HTML mimetype
/// are skipped. At most `limit` items are returned.
pub fn parse_cdx_rows(rows: &[Vec<String>], limit: usize) -> Vec<SnapshotItem> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };

    let column = |name: &str| header.iter().position(|h| h == name);
    let (Some(ts_idx), Some(original_idx)) = (column("timestamp"), column("original")) else {
        return Vec::new();
    };
    let status_idx = column("statuscode");
    let mime_idx = column("mimetype");

    data.iter()
        .filter_map(|row| {
            let timestamp = row.get(ts_idx)?;
            let original = row.get(original_idx)?;
            if !is_capture_timestamp(timestamp) || original.is_empty() {
                return None;
            }

            if let Some(status) = status_idx.and_then(|i| row.get(i)) {
                if !status.is_empty() && status != "200" {
                    return None;
                }
            }
            if let Some(mime) = mime_idx.and_then(|i| row.get(i)) {
                if !mime.is_empty() && !mime.starts_with("text/html") {
                    return None;
                }
            }

            Some(SnapshotItem::new(timestamp.as_str(), original))
        })
        .take(limit)
        .collect()
}

impl WaybackClient {
    pub fn new(http_client: reqwest::Client, config: &HuntConfig) -> Self {
        Self {
            http_client,
            cdx_endpoint: CDX_SEARCH_URL.to_string(),
            availability_endpoint: AVAILABILITY_URL.to_string(),
            replay_base: REPLAY_BASE_URL.to_string(),
            request_timeout: config.request_timeout,
            download_timeout: config.download_timeout,
            include_latest_capture: config.include_latest_capture,
        }
    }

    /// Point the client at other endpoints (test server or mirror).
    pub fn with_endpoints<C, A, R>(mut self, cdx: C, availability: A, replay_base: R) -> Self
    where
        C: Into<String>,
        A: Into<String>,
        R: Into<String>,
    {
        self.cdx_endpoint = cdx.into();
        self.availability_endpoint = availability.into();
        self.replay_base = replay_base.into();
        self
    }

    async fn fetch_cdx(&self, base_url: &str, limit: usize) -> Result<Vec<SnapshotItem>, HuntError> {
        let limit_param = limit.to_string();
        let response = self
            .http_client
            .get(&self.cdx_endpoint)
            .query(&[
                ("url", base_url),
                ("output", "json"),
                ("limit", limit_param.as_str()),
                ("fl", "timestamp,original,statuscode,mimetype"),
                ("filter", "statuscode:200"),
                ("filter", "mimetype:text/html"),
            ])
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| HuntError::from_request(e, "CDX query", self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HuntError::provider_with_status(
                "wayback",
                format!("CDX query for {} returned {}", base_url, status),
                status.as_u16(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HuntError::from_request(e, "CDX query", self.request_timeout))?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<Vec<String>> = serde_json::from_str(&body)?;
        Ok(parse_cdx_rows(&rows, limit))
    }

    /// Newest capture reported by the availability API, if any.
    async fn fetch_latest(&self, base_url: &str) -> Result<Option<SnapshotItem>, HuntError> {
        let response = self
            .http_client
            .get(&self.availability_endpoint)
            .query(&[("url", base_url)])
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| HuntError::from_request(e, "newest capture lookup", self.request_timeout))?;

        if !response.status().is_success() {
            return Err(HuntError::provider_with_status(
                "wayback",
                "availability API error",
                response.status().as_u16(),
            ));
        }

        let parsed = response.json::<AvailabilityResponse>().await?;
        Ok(parsed
            .archived_snapshots
            .closest
            .as_ref()
            .and_then(ClosestCapture::to_snapshot))
    }
}

#[async_trait]
impl ArchiveProvider for WaybackClient {
    async fn list_snapshots(
        &self,
        base_url: &str,
        limit: usize,
    ) -> Result<Vec<SnapshotItem>, HuntError> {
        let mut items = self.fetch_cdx(base_url, limit).await?;
        debug!(base_url, count = items.len(), "CDX listing");

        if self.include_latest_capture {
            match self.fetch_latest(base_url).await {
                Ok(Some(latest)) => {
                    if !items.iter().any(|s| s.timestamp == latest.timestamp) {
                        items.push(latest);
                    }
                }
                Ok(None) => {}
                Err(e) => debug!(base_url, error = %e, "newest capture lookup ignored"),
            }
        }

        Ok(items)
    }

    async fn download_page(&self, snapshot: &SnapshotItem) -> Result<FetchedPage, HuntError> {
        let url = self.archive_url(snapshot);
        let response = self
            .http_client
            .get(&url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| HuntError::from_request(e, "archive download", self.download_timeout))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| HuntError::from_request(e, "archive download", self.download_timeout))?
            .to_vec();

        debug!(url = %url, status, content_type = %content_type, "archived page fetched");

        Ok(FetchedPage {
            status,
            content_type,
            body,
        })
    }

    fn archive_url(&self, snapshot: &SnapshotItem) -> String {
        snapshot.archive_url(&self.replay_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &str) -> Vec<Vec<String>> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_parse_cdx_rows_filters_and_normalizes() {
        let data = rows(
            r#"[
                ["timestamp","original","statuscode","mimetype"],
                ["20200101000000","http://example.com:80/","200","text/html"],
                ["20200102000000","http://example.com/robots.txt","200","text/plain"],
                ["20200103000000","http://example.com/","301","text/html"],
                ["2020","http://example.com/","200","text/html"],
                ["20200104000000","https://example.com/","-","text/html; charset=utf-8"]
            ]"#,
        );

        let items = parse_cdx_rows(&data, 10);
        assert_eq!(
            items,
            vec![SnapshotItem::new("20200101000000", "http://example.com/")]
        );
    }

    #[test]
    fn test_parse_cdx_rows_respects_limit_and_column_order() {
        let data = rows(
            r#"[
                ["original","timestamp"],
                ["https://example.com/","20210101000000"],
                ["https://example.com/","20210201000000"],
                ["https://example.com/","20210301000000"]
            ]"#,
        );

        let items = parse_cdx_rows(&data, 2);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].timestamp, "20210101000000");
    }

    #[test]
    fn test_parse_cdx_rows_empty() {
        assert!(parse_cdx_rows(&[], 5).is_empty());
        assert!(parse_cdx_rows(&rows(r#"[["timestamp","original"]]"#), 5).is_empty());
    }

    #[test]
    fn test_closest_capture_to_snapshot() {
        let closest = ClosestCapture {
            available: true,
            url: "http://web.archive.org/web/20240101000000/https://example.com:443/".to_string(),
            timestamp: "20240101000000".to_string(),
            status: Some("200".to_string()),
        };
        assert_eq!(
            closest.to_snapshot(),
            Some(SnapshotItem::new("20240101000000", "https://example.com/"))
        );

        let bare = ClosestCapture {
            available: true,
            url: "http://web.archive.org/web/20240101000000/example.com/".to_string(),
            timestamp: String::new(),
            status: None,
        };
        assert_eq!(
            bare.to_snapshot().map(|s| s.original_url),
            Some("https://example.com/".to_string())
        );

        let missing = ClosestCapture::default();
        assert_eq!(missing.to_snapshot(), None);
    }
}
