//! Configuration file parsing, environment overrides and credentials.
//!
//! Settings are layered with CLI flags over `DH_*` environment variables over
//! TOML config files over built-in defaults. Credentials only come from the
//! environment (optionally seeded from a `.env` file).

use crate::error::HuntError;
use crate::types::HuntConfig;
use crate::utils::parse_duration_string;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ENV_INTERNETBS_API_KEY: &str = "INTERNETBS_API_KEY";
pub const ENV_INTERNETBS_PASSWORD: &str = "INTERNETBS_PASSWORD";
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_GOOGLE_CX: &str = "GOOGLE_CX";

/// API credentials for the registrar and search providers.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub internetbs_api_key: String,
    pub internetbs_password: String,
    pub google_api_key: String,
    pub google_cx: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("internetbs_api_key", &"<redacted>")
            .field("internetbs_password", &"<redacted>")
            .field("google_api_key", &"<redacted>")
            .field("google_cx", &self.google_cx)
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first
    /// when present; variables already set in the environment win.
    pub fn from_env() -> Result<Self, HuntError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "ignoring unreadable .env file"),
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build credentials from an arbitrary variable lookup.
    ///
    /// Values are trimmed and empty values count as missing. The error names
    /// every missing variable, not just the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HuntError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |name: &str| -> String {
            match lookup(name).map(|v| v.trim().to_string()) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        };

        let credentials = Self {
            internetbs_api_key: read(ENV_INTERNETBS_API_KEY),
            internetbs_password: read(ENV_INTERNETBS_PASSWORD),
            google_api_key: read(ENV_GOOGLE_API_KEY),
            google_cx: read(ENV_GOOGLE_CX),
        };

        if missing.is_empty() {
            Ok(credentials)
        } else {
            Err(HuntError::MissingCredentials { vars: missing })
        }
    }
}

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// The `[defaults]` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_archives: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_limit: Option<usize>,

    /// Request timeout (as string, e.g., "5s", "30s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_delay_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_www_variants: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_latest_capture: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl DefaultsConfig {
    /// Overlay the values present in this table onto `config`.
    pub fn apply_to(&self, mut config: HuntConfig) -> HuntConfig {
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(max_archives) = self.max_archives {
            config = config.with_max_archives(max_archives);
        }
        if let Some(limit) = self.snapshot_limit {
            config = config.with_snapshot_limit(limit);
        }
        if let Some(timeout) = self.timeout.as_deref().and_then(parse_duration_string) {
            config = config.with_request_timeout(timeout);
        }
        if let Some(delay) = self.download_delay_ms {
            config = config.with_download_delay(Duration::from_millis(delay));
        }
        if let Some(enabled) = self.include_www_variants {
            config = config.with_www_variants(enabled);
        }
        if let Some(enabled) = self.include_latest_capture {
            config = config.with_latest_capture(enabled);
        }
        if let Some(enabled) = self.overwrite {
            config = config.with_overwrite(enabled);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        config
    }

    fn overlay(mut self, higher: DefaultsConfig) -> Self {
        if higher.concurrency.is_some() {
            self.concurrency = higher.concurrency;
        }
        if higher.max_archives.is_some() {
            self.max_archives = higher.max_archives;
        }
        if higher.snapshot_limit.is_some() {
            self.snapshot_limit = higher.snapshot_limit;
        }
        if higher.timeout.is_some() {
            self.timeout = higher.timeout;
        }
        if higher.download_delay_ms.is_some() {
            self.download_delay_ms = higher.download_delay_ms;
        }
        if higher.include_www_variants.is_some() {
            self.include_www_variants = higher.include_www_variants;
        }
        if higher.include_latest_capture.is_some() {
            self.include_latest_capture = higher.include_latest_capture;
        }
        if higher.overwrite.is_some() {
            self.overwrite = higher.overwrite;
        }
        if higher.user_agent.is_some() {
            self.user_agent = higher.user_agent;
        }
        self
    }
}

impl FileConfig {
    /// Apply the file's defaults (if any) to `config`.
    pub fn apply_to(&self, config: HuntConfig) -> HuntConfig {
        match &self.defaults {
            Some(defaults) => defaults.apply_to(config),
            None => config,
        }
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which config files were found
    pub verbose: bool,
}

impl ConfigManager {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load and validate configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, HuntError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HuntError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            HuntError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            HuntError::config(format!(
                "Failed to parse TOML configuration {}: {}",
                path.display(),
                e
            ))
        })?;

        self.validate_config(&config)?;
        debug!(path = %path.display(), "loaded config file");

        Ok(config)
    }

    /// Discover and merge config files, lowest precedence first.
    ///
    /// A discovered file that fails to parse or validate is an error rather
    /// than silently skipped.
    pub fn discover_and_load(&self) -> Result<FileConfig, HuntError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            let config = self.load_file(&path)?;
            merged_config = self.merge_configs(merged_config, config);
            loaded_files.push(path);
        }

        if self.verbose && loaded_files.len() > 1 {
            for (i, path) in loaded_files.iter().enumerate() {
                let status = if i == loaded_files.len() - 1 {
                    "highest precedence"
                } else {
                    "overridden"
                };
                info!(path = %path.display(), status, "config file");
            }
        }

        Ok(merged_config)
    }

    /// Load an explicit config file if given, otherwise discover one.
    pub fn load(&self, explicit: Option<&Path>) -> Result<FileConfig, HuntError> {
        match explicit {
            Some(path) => self.load_file(path),
            None => self.discover_and_load(),
        }
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./domhunter.toml", "./.domhunter.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".domhunter.toml");
        path.exists().then_some(path)
    }

    /// `$XDG_CONFIG_HOME/domhunter/config.toml`, falling back to `~/.config`.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domhunter").join("config.toml");
        path.exists().then_some(path)
    }

    /// Values from `higher` take precedence over values from `lower`.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => {
                    Some(lower_defaults.overlay(higher_defaults))
                }
                (None, Some(higher_defaults)) => Some(higher_defaults),
                (Some(lower_defaults), None) => Some(lower_defaults),
                (None, None) => None,
            },
        }
    }

    fn validate_config(&self, config: &FileConfig) -> Result<(), HuntError> {
        let Some(defaults) = &config.defaults else {
            return Ok(());
        };

        if let Some(concurrency) = defaults.concurrency {
            if concurrency == 0 || concurrency > 100 {
                return Err(HuntError::config("Concurrency must be between 1 and 100"));
            }
        }

        if defaults.snapshot_limit == Some(0) {
            return Err(HuntError::config("Snapshot limit must be at least 1"));
        }

        if let Some(timeout_str) = &defaults.timeout {
            if parse_duration_string(timeout_str).is_none() {
                return Err(HuntError::config(format!(
                    "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                    timeout_str
                )));
            }
        }

        Ok(())
    }
}

/// Settings taken from `DH_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub max_archives: Option<usize>,
    pub snapshot_limit: Option<usize>,
    pub timeout: Option<Duration>,
    pub download_delay_ms: Option<u64>,
    pub overwrite: Option<bool>,
    pub no_www: Option<bool>,
    pub config: Option<String>,
}

impl EnvConfig {
    pub fn apply_to(&self, mut config: HuntConfig) -> HuntConfig {
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(max_archives) = self.max_archives {
            config = config.with_max_archives(max_archives);
        }
        if let Some(limit) = self.snapshot_limit {
            config = config.with_snapshot_limit(limit);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_request_timeout(timeout);
        }
        if let Some(delay) = self.download_delay_ms {
            config = config.with_download_delay(Duration::from_millis(delay));
        }
        if let Some(overwrite) = self.overwrite {
            config = config.with_overwrite(overwrite);
        }
        if let Some(no_www) = self.no_www {
            config = config.with_www_variants(!no_www);
        }
        config
    }
}

/// Load `DH_*` settings from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    load_env_config_from(|name| env::var(name).ok(), verbose)
}

/// Same as [`load_env_config`] over an arbitrary variable lookup.
pub fn load_env_config_from<F>(lookup: F, verbose: bool) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();
    let report = |name: &str, value: &str| {
        if verbose {
            info!("using {}={}", name, value);
        }
    };

    if let Some(val) = lookup("DH_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(n) if (1..=100).contains(&n) => {
                env_config.concurrency = Some(n);
                report("DH_CONCURRENCY", &val);
            }
            _ => warn!("invalid DH_CONCURRENCY='{}', must be 1-100", val),
        }
    }

    if let Some(val) = lookup("DH_MAX_ARCHIVES") {
        match val.trim().parse::<usize>() {
            Ok(n) => {
                env_config.max_archives = Some(n);
                report("DH_MAX_ARCHIVES", &val);
            }
            Err(_) => warn!("invalid DH_MAX_ARCHIVES='{}'", val),
        }
    }

    if let Some(val) = lookup("DH_SNAPSHOT_LIMIT") {
        match val.trim().parse::<usize>() {
            Ok(n) if n > 0 => {
                env_config.snapshot_limit = Some(n);
                report("DH_SNAPSHOT_LIMIT", &val);
            }
            _ => warn!("invalid DH_SNAPSHOT_LIMIT='{}', must be at least 1", val),
        }
    }

    if let Some(val) = lookup("DH_TIMEOUT") {
        match parse_duration_string(&val) {
            Some(timeout) => {
                env_config.timeout = Some(timeout);
                report("DH_TIMEOUT", &val);
            }
            None => warn!(
                "invalid DH_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                val
            ),
        }
    }

    if let Some(val) = lookup("DH_DOWNLOAD_DELAY_MS") {
        match val.trim().parse::<u64>() {
            Ok(ms) => {
                env_config.download_delay_ms = Some(ms);
                report("DH_DOWNLOAD_DELAY_MS", &val);
            }
            Err(_) => warn!("invalid DH_DOWNLOAD_DELAY_MS='{}'", val),
        }
    }

    if let Some(val) = lookup("DH_OVERWRITE") {
        match parse_bool(&val) {
            Some(b) => {
                env_config.overwrite = Some(b);
                report("DH_OVERWRITE", &val);
            }
            None => warn!("invalid DH_OVERWRITE='{}', use true/false", val),
        }
    }

    if let Some(val) = lookup("DH_NO_WWW") {
        match parse_bool(&val) {
            Some(b) => {
                env_config.no_www = Some(b);
                report("DH_NO_WWW", &val);
            }
            None => warn!("invalid DH_NO_WWW='{}', use true/false", val),
        }
    }

    if let Some(path) = lookup("DH_CONFIG") {
        if !path.trim().is_empty() {
            report("DH_CONFIG", &path);
            env_config.config = Some(path);
        }
    }

    env_config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
