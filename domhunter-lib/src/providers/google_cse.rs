//! Search indexation through the Google Custom Search JSON API.
//!
//! A `site:<domain>` query with one result is enough: only the reported total
//! matters.

use super::IndexProvider;
use crate::error::HuntError;
use crate::types::Indexation;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Default Custom Search endpoint.
pub const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Indexation client for Google Custom Search.
#[derive(Clone)]
pub struct GoogleCseClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    cx: String,
    timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub search_information: Option<SearchInformation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInformation {
    /// Decimal string, e.g. "1240"
    #[serde(default)]
    pub total_results: Option<String>,
}

impl SearchResponse {
    /// Total hits reported by the API; a missing block means zero.
    pub fn total_results(&self) -> Result<u64, HuntError> {
        let raw = self
            .search_information
            .as_ref()
            .and_then(|info| info.total_results.as_deref())
            .unwrap_or("0");

        raw.trim()
            .parse::<u64>()
            .map_err(|_| HuntError::parse(format!("totalResults is not a number: '{}'", raw)))
    }
}

impl GoogleCseClient {
    pub fn new(http_client: reqwest::Client, api_key: &str, cx: &str, timeout: Duration) -> Self {
        Self {
            http_client,
            endpoint: GOOGLE_CSE_URL.to_string(),
            api_key: api_key.to_string(),
            cx: cx.to_string(),
            timeout,
        }
    }

    /// Point the client at another endpoint (test server).
    pub fn with_endpoint<E: Into<String>>(mut self, endpoint: E) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn request(&self, domain: &str) -> Result<u64, HuntError> {
        let query = format!("site:{}", domain);
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cx.as_str()),
                ("q", query.as_str()),
                ("num", "1"),
                ("fields", "searchInformation(totalResults)"),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let parsed = response.json::<SearchResponse>().await?;
                parsed.total_results()
            }
            StatusCode::FORBIDDEN => Err(HuntError::provider_with_status(
                "google-cse",
                "quota exhausted or credentials rejected",
                403,
            )),
            StatusCode::TOO_MANY_REQUESTS => Err(HuntError::provider_with_status(
                "google-cse",
                "rate limited",
                429,
            )),
            code => Err(HuntError::provider_with_status(
                "google-cse",
                format!("search returned {}", code),
                code.as_u16(),
            )),
        }
    }
}

#[async_trait]
impl IndexProvider for GoogleCseClient {
    async fn check_indexed(&self, domain: &str) -> Indexation {
        match self.request(domain).await {
            Ok(total) if total > 0 => Indexation::Indexed,
            Ok(_) => Indexation::NotIndexed,
            Err(e) => {
                warn!(domain, error = %e, "indexation check failed");
                Indexation::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_results_parsing() {
        let parsed: SearchResponse =
            serde_json::from_str(r#"{"searchInformation":{"totalResults":"1240"}}"#).unwrap();
        assert_eq!(parsed.total_results().unwrap(), 1240);

        let empty: SearchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.total_results().unwrap(), 0);

        let garbage: SearchResponse =
            serde_json::from_str(r#"{"searchInformation":{"totalResults":"many"}}"#).unwrap();
        assert!(garbage.total_results().is_err());
    }
}
