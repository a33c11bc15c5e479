//! Registrar availability through the Internet.bs `Domain/Check` API.

use super::AvailabilityProvider;
use crate::error::HuntError;
use crate::types::Availability;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Internet.bs availability endpoint.
pub const INTERNETBS_CHECK_URL: &str = "https://api.internet.bs/Domain/Check";

/// Availability client for Internet.bs.
#[derive(Clone)]
pub struct InternetBsClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    password: String,
    timeout: Duration,
}

/// Fields of a `Domain/Check` JSON response that matter to us.
///
/// Current API versions report `status`; the `available` / `isAvailable`
/// spellings come from older response shapes.
#[derive(Debug, Default, Deserialize)]
pub struct DomainCheckResponse {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub available: Option<serde_json::Value>,

    #[serde(default, rename = "isAvailable", alias = "isavailable")]
    pub is_available: Option<bool>,

    #[serde(default)]
    pub message: Option<String>,
}

impl DomainCheckResponse {
    /// Map the parsed response onto the tri-state answer.
    pub fn availability(&self) -> Availability {
        if let Some(status) = &self.status {
            match status.trim().to_ascii_lowercase().as_str() {
                "available" => return Availability::Available,
                "unavailable" | "taken" => return Availability::Unavailable,
                _ => {}
            }
        }

        match &self.available {
            Some(serde_json::Value::Bool(true)) => return Availability::Available,
            Some(serde_json::Value::Bool(false)) => return Availability::Unavailable,
            Some(serde_json::Value::String(flag)) => {
                match flag.trim().to_ascii_lowercase().as_str() {
                    "yes" | "true" => return Availability::Available,
                    "no" | "false" => return Availability::Unavailable,
                    _ => {}
                }
            }
            _ => {}
        }

        match self.is_available {
            Some(true) => Availability::Available,
            Some(false) => Availability::Unavailable,
            None => Availability::Unknown,
        }
    }
}

impl InternetBsClient {
    pub fn new(http_client: reqwest::Client, api_key: &str, password: &str, timeout: Duration) -> Self {
        Self {
            http_client,
            endpoint: INTERNETBS_CHECK_URL.to_string(),
            api_key: api_key.to_string(),
            password: password.to_string(),
            timeout,
        }
    }

    /// Point the client at another endpoint (sandbox or test server).
    pub fn with_endpoint<E: Into<String>>(mut self, endpoint: E) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn request(&self, domain: &str) -> Result<DomainCheckResponse, HuntError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("ApiKey", self.api_key.as_str()),
                ("Password", self.password.as_str()),
                ("Domain", domain),
                ("ResponseFormat", "JSON"),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HuntError::provider_with_status(
                "internetbs",
                format!("Domain/Check returned {}", status),
                status.as_u16(),
            ));
        }

        Ok(response.json::<DomainCheckResponse>().await?)
    }
}

#[async_trait]
impl AvailabilityProvider for InternetBsClient {
    async fn check_availability(&self, domain: &str) -> Availability {
        match self.request(domain).await {
            Ok(parsed) => {
                let availability = parsed.availability();
                if availability == Availability::Unknown {
                    debug!(
                        domain,
                        status = ?parsed.status,
                        message = ?parsed.message,
                        "ambiguous availability response"
                    );
                }
                availability
            }
            Err(e) => {
                warn!(domain, error = %e, "availability check failed");
                Availability::Unknown
            }
        }
    }
}
