//! Error handling for the domain enrichment pipeline.
//!
//! Provider calls never surface these errors past the provider boundary for
//! availability and indexation; they are converted to an unknown result
//! instead. The archive stage and configuration loading do propagate them.

use std::fmt;

/// Main error type for domhunter operations.
#[derive(Debug, Clone)]
pub enum HuntError {
    /// Invalid domain name format
    InvalidDomain { domain: String, reason: String },

    /// Network-related errors (connection, DNS, TLS, etc.)
    Network {
        message: String,
        source: Option<String>,
    },

    /// A provider answered with something we cannot use
    Provider {
        provider: String,
        message: String,
        status_code: Option<u16>,
    },

    /// JSON parsing errors for provider responses and manifests
    Parse { message: String },

    /// Configuration errors (invalid settings, bad TOML, etc.)
    Config { message: String },

    /// File I/O errors when reading inputs or writing outputs
    File { path: String, message: String },

    /// Required provider credentials are absent
    MissingCredentials { vars: Vec<String> },

    /// Timeout errors when operations take too long
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl HuntError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new provider error carrying the HTTP status.
    pub fn provider_with_status<P: Into<String>, M: Into<String>>(
        provider: P,
        message: M,
        status_code: u16,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Convert a failed HTTP exchange, keeping the deadline when it timed out.
    pub fn from_request(
        err: reqwest::Error,
        operation: &str,
        deadline: std::time::Duration,
    ) -> Self {
        if err.is_timeout() {
            Self::timeout(operation, deadline)
        } else {
            err.into()
        }
    }

    /// Check if this error suggests the operation could succeed on a later attempt.
    ///
    /// Informational only: the pipeline never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::Timeout { .. }
                | Self::Provider {
                    status_code: Some(429 | 500..=599),
                    ..
                }
        )
    }
}

impl fmt::Display for HuntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::Network { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::Provider {
                provider,
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "{} error (HTTP {}): {}", provider, code, message)
                } else {
                    write!(f, "{} error: {}", provider, message)
                }
            }
            Self::Parse { message } => {
                write!(f, "Parse error: {}", message)
            }
            Self::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::File { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::MissingCredentials { vars } => {
                write!(f, "Missing credentials: {}", vars.join(", "))
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for HuntError {}

impl From<reqwest::Error> for HuntError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else if err.is_decode() {
            Self::parse(format!("Response decoding failed: {}", err))
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for HuntError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            message: format!("JSON parsing failed: {}", err),
        }
    }
}

impl From<std::io::Error> for HuntError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for HuntError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_retryable_classification() {
        assert!(HuntError::network("reset").is_retryable());
        assert!(HuntError::timeout("cdx", Duration::from_secs(3)).is_retryable());
        assert!(HuntError::provider_with_status("wayback", "busy", 503).is_retryable());
        assert!(HuntError::provider_with_status("google-cse", "quota", 429).is_retryable());

        assert!(!HuntError::provider_with_status("google-cse", "forbidden", 403).is_retryable());
        assert!(!HuntError::config("bad").is_retryable());
    }

    #[test]
    fn test_missing_credentials_display_lists_all() {
        let err = HuntError::MissingCredentials {
            vars: vec!["GOOGLE_API_KEY".to_string(), "GOOGLE_CX".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing credentials: GOOGLE_API_KEY, GOOGLE_CX"
        );
    }

    #[tokio::test]
    async fn test_request_timeout_maps_to_timeout() {
        // Accepts the connection and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let deadline = Duration::from_millis(200);
        let err = reqwest::Client::new()
            .get(format!("http://{}/", addr))
            .timeout(deadline)
            .send()
            .await
            .unwrap_err();
        let mapped = HuntError::from_request(err, "CDX query", deadline);

        assert!(
            matches!(&mapped, HuntError::Timeout { operation, duration }
                if operation == "CDX query" && *duration == deadline),
            "mapped: {:?}",
            mapped
        );
        assert!(mapped.is_retryable());
        server.abort();
    }

    #[test]
    fn test_provider_display_includes_status() {
        let err = HuntError::provider_with_status("wayback", "CDX server error", 502);
        assert_eq!(err.to_string(), "wayback error (HTTP 502): CDX server error");
    }
}
