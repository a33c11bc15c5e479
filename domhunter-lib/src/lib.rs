//! # Domhunter Library
//!
//! Batch enrichment of domain names for expired-domain research.
//!
//! For every domain the pipeline asks, in order:
//!
//! 1. Can it be registered? (registrar availability API)
//! 2. Does a search engine still index pages of it? (search API)
//! 3. What did it look like? (web-archive captures, downloaded as HTML)
//!
//! Each step runs only when the previous answer is a definite "yes", so no
//! quota is spent on domains that are already taken or forgotten.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domhunter_lib::{Credentials, DomainHunter, HuntConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::from_env()?;
//!     let config = HuntConfig::default().with_max_archives(3);
//!     let hunter = DomainHunter::new(&credentials, config, "output")?;
//!
//!     for result in hunter.hunt_domains(&["example.com".to_string()]).await {
//!         println!("{} available={} indexed={}", result.domain, result.available, result.indexed);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Short-circuit chain**: later, costlier checks only run when they matter
//! - **Tri-state answers**: provider failures are `unknown`, never a false "no"
//! - **Bounded concurrency**: one gate caps in-flight domain pipelines
//! - **Pluggable providers**: every external service sits behind a trait

// Re-export main public API types and functions
// This makes them available as domhunter_lib::TypeName
pub use concurrent::{ConcurrencyGate, GatePermit};
pub use config::{load_env_config, ConfigManager, Credentials, EnvConfig, FileConfig};
pub use error::HuntError;
pub use hunter::DomainHunter;
pub use processor::process_domain;
pub use types::{
    Availability, DomainResult, FetchedPage, HuntConfig, Indexation, SnapshotItem,
};
pub use utils::{normalize_domain, parse_duration_string, read_domains_file, validate_domain};

// Public modules
pub mod archive;
pub mod output;
pub mod providers;
pub mod snapshots;

// Internal modules - re-exported above where they are part of the API
mod concurrent;
mod config;
mod error;
mod hunter;
mod processor;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, HuntError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
