//! Utility functions for domain input handling.
//!
//! Domain names arrive from user-maintained text files, often pasted from a
//! browser. They are normalized to a lowercase ASCII host before any provider
//! sees them.

use crate::error::HuntError;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn domain_pattern() -> &'static Regex {
    static DOMAIN_RE: OnceLock<Regex> = OnceLock::new();
    DOMAIN_RE.get_or_init(|| Regex::new(r"^[a-z0-9.-]+$").expect("static domain pattern"))
}

/// Normalize a raw domain entry.
///
/// Strips surrounding whitespace, an `http(s)://` scheme, any path and a
/// trailing dot, lowercases, and converts internationalized names to
/// punycode. Returns `None` when nothing usable remains.
///
/// # Example
///
/// ```rust
/// use domhunter_lib::normalize_domain;
///
/// assert_eq!(normalize_domain(" https://www.Example.com/path "), Some("www.example.com".to_string()));
/// assert_eq!(normalize_domain("not a domain"), None);
/// ```
pub fn normalize_domain(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .trim()
        .trim_end_matches('.');
    if host.is_empty() {
        return None;
    }

    // IDNA conversion; rejects spaces and other forbidden host code points
    let ascii = match url::Host::parse(host) {
        Ok(url::Host::Domain(domain)) => domain,
        _ => return None,
    };
    let ascii = ascii.trim_end_matches('.').to_string();

    if !ascii.contains('.') || !domain_pattern().is_match(&ascii) {
        return None;
    }

    Some(ascii)
}

/// Validate a domain name, returning the normalized form.
pub fn validate_domain(raw: &str) -> Result<String, HuntError> {
    normalize_domain(raw)
        .ok_or_else(|| HuntError::invalid_domain(raw.trim(), "not a valid domain name"))
}

/// Parse newline-delimited domain entries.
///
/// Blank lines and `#` comments (whole-line or inline) are ignored. The
/// result is normalized, sorted and de-duplicated.
pub fn parse_domain_lines(content: &str) -> Vec<String> {
    let mut domains: Vec<String> = content
        .lines()
        .filter_map(|line| {
            let entry = line.split('#').next().unwrap_or("").trim();
            if entry.is_empty() {
                None
            } else {
                normalize_domain(entry)
            }
        })
        .collect();

    domains.sort();
    domains.dedup();
    domains
}

/// Read a newline-delimited domain list from disk.
///
/// # Errors
///
/// Returns `HuntError::File` if the file is missing or unreadable. A file
/// without a single valid domain yields an empty list.
pub fn read_domains_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, HuntError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(HuntError::file_error(
            path.to_string_lossy(),
            "File not found",
        ));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        HuntError::file_error(path.to_string_lossy(), format!("Failed to read file: {}", e))
    })?;

    Ok(parse_domain_lines(&content))
}

/// Parse a duration string like "5s", "30s", "2m" or "500ms".
///
/// A bare number is read as seconds.
pub fn parse_duration_string(value: &str) -> Option<std::time::Duration> {
    let value = value.trim().to_lowercase();

    if let Some(ms) = value.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(std::time::Duration::from_millis)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(std::time::Duration::from_secs)
    } else if let Some(mins) = value.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .map(|m| std::time::Duration::from_secs(m * 60))
    } else {
        value.parse::<u64>().ok().map(std::time::Duration::from_secs)
    }
}
