//! Domhunter CLI Application
//!
//! Reads a list of domains, runs each through the availability → indexation →
//! archive chain of domhunter-lib, and writes `results.json`, `results.csv`
//! and the downloaded archive pages into an output directory.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domhunter_lib::output::{write_csv_results, write_json_results};
use domhunter_lib::{
    load_env_config, parse_duration_string, read_domains_file, ConfigManager, Credentials,
    DomainHunter, DomainResult, HuntConfig, HuntError,
};
use futures::StreamExt;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

const EXIT_FAILURE: i32 = 1;
const EXIT_MISSING_CREDENTIALS: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

/// CLI arguments for domhunter
#[derive(Parser, Debug)]
#[command(name = "domhunter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find expired domains worth registering and pull their archived pages")]
#[command(
    long_about = "Check each domain for registrar availability, then search-engine indexation, then download its archived HTML from the Wayback Machine.\n\nLater checks only run when the previous answer is a definite yes.\n\nCredentials are read from INTERNETBS_API_KEY, INTERNETBS_PASSWORD, GOOGLE_API_KEY and GOOGLE_CX (a .env file is honored)."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// File with one domain per line (# starts a comment)
    #[arg(
        short = 'd',
        long = "domains",
        value_name = "FILE",
        help_heading = "Input"
    )]
    pub domains: PathBuf,

    /// Output directory for results and archives
    #[arg(
        short = 'o',
        long = "out",
        value_name = "DIR",
        default_value = "output",
        help_heading = "Output"
    )]
    pub out: PathBuf,

    /// Archived pages to download per domain
    #[arg(long = "max-archives", value_name = "N", help_heading = "Archive")]
    pub max_archives: Option<usize>,

    /// Snapshots listed per URL variant and kept after merging
    #[arg(long = "snapshot-limit", value_name = "N", value_parser = clap::value_parser!(u64).range(1..), help_heading = "Archive")]
    pub snapshot_limit: Option<u64>,

    /// Delay between archive downloads of one domain, in milliseconds
    #[arg(long = "delay-ms", value_name = "N", help_heading = "Archive")]
    pub delay_ms: Option<u64>,

    /// Only query the bare domain, not its www. variant
    #[arg(long = "no-www", help_heading = "Archive")]
    pub no_www: bool,

    /// Skip the newest-capture lookup
    #[arg(long = "no-latest", help_heading = "Archive")]
    pub no_latest: bool,

    /// Re-download pages that already exist on disk
    #[arg(long = "overwrite", help_heading = "Archive")]
    pub overwrite: bool,

    /// Max domains processed at once (1-100)
    #[arg(short = 'c', long = "concurrency", value_name = "N", value_parser = clap::value_parser!(u64).range(1..=100), help_heading = "Performance")]
    pub concurrency: Option<u64>,

    /// Per-request timeout (e.g. 10s, 2m)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Use a specific config file instead of discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Show progress details (info-level logs)
    #[arg(short = 'v', long = "verbose", help_heading = "Logging")]
    pub verbose: bool,

    /// Show debug-level logs
    #[arg(long = "debug", help_heading = "Logging")]
    pub debug: bool,

    /// Suppress per-domain lines (a spinner shows progress instead)
    #[arg(short = 'q', long = "quiet", help_heading = "Logging")]
    pub quiet: bool,
}

/// How a run ended when no error occurred.
#[derive(Debug, PartialEq, Eq)]
enum RunOutcome {
    Completed,
    Interrupted,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(&args);

    debug!("domhunter v{} starting", env!("CARGO_PKG_VERSION"));

    let code = match run(args).await {
        Ok(RunOutcome::Completed) => 0,
        Ok(RunOutcome::Interrupted) => {
            eprintln!("Interrupted");
            EXIT_INTERRUPTED
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code_for(e.as_ref())
        }
    };
    process::exit(code);
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_logging(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,domhunter={level},domhunter_lib={level}",
            level = level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code_for(err: &(dyn Error + 'static)) -> i32 {
    match err.downcast_ref::<HuntError>() {
        Some(HuntError::MissingCredentials { .. }) => EXIT_MISSING_CREDENTIALS,
        _ => EXIT_FAILURE,
    }
}

async fn run(args: Args) -> Result<RunOutcome, Box<dyn Error>> {
    let config = build_config(&args)?;
    let credentials = Credentials::from_env()?;

    let domains = read_domains_file(&args.domains)?;
    if domains.is_empty() {
        return Err(format!("No valid domains found in {}", args.domains.display()).into());
    }

    let hunter = DomainHunter::new(&credentials, config, &args.out)?;
    let total = domains.len();

    if !args.quiet {
        ui::print_header(
            total,
            hunter.config().concurrency,
            hunter.config().max_archives,
        );
    }
    let spinner = if show_spinner(args.quiet, total) {
        ui::Spinner::start(format!("Hunting {} domains...", total))
    } else {
        None
    };

    let start_time = std::time::Instant::now();
    let hunted = hunt_all(&hunter, &domains, args.quiet).await;

    if let Some(spinner) = spinner {
        spinner.stop().await;
    }

    let (results, stats) = match hunted {
        Some(done) => done,
        None => return Ok(RunOutcome::Interrupted),
    };
    let duration = start_time.elapsed();

    let json_path = write_json_results(&args.out, &results).await?;
    let csv_path = write_csv_results(&args.out, &results).await?;

    println!();
    ui::print_summary(&stats, duration);
    ui::print_outputs(&json_path, &csv_path, hunter.archive_root());

    Ok(RunOutcome::Completed)
}

/// The spinner stands in for the per-domain lines, which would overwrite it.
fn show_spinner(quiet: bool, total: usize) -> bool {
    quiet && total > 1
}

/// Drive the batch to completion, or return `None` on Ctrl-C.
///
/// Results are printed as they complete and returned in input order.
async fn hunt_all(
    hunter: &DomainHunter,
    domains: &[String],
    quiet: bool,
) -> Option<(Vec<DomainResult>, ui::RunStats)> {
    let total = domains.len();
    let mut slots: Vec<Option<DomainResult>> = vec![None; total];
    let mut stats = ui::RunStats::default();

    let stream = hunter.hunt_domains_stream(domains);
    tokio::pin!(stream);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut signal_armed = true;

    loop {
        tokio::select! {
            next = stream.next() => {
                let Some((index, result)) = next else { break };
                stats.record(&result);
                if !quiet {
                    ui::print_result(&result, (stats.total, total));
                }
                slots[index] = Some(result);
            }
            signal = &mut ctrl_c, if signal_armed => {
                match signal {
                    Ok(()) => return None,
                    Err(e) => {
                        warn!(error = %e, "could not listen for Ctrl-C");
                        signal_armed = false;
                    }
                }
            }
        }
    }

    let results = slots
        .into_iter()
        .zip(domains)
        .map(|(slot, domain)| slot.unwrap_or_else(|| DomainResult::new(domain.as_str())))
        .collect();
    Some((results, stats))
}

/// Resolve settings: defaults < config file < DH_* env < CLI flags.
fn build_config(args: &Args) -> Result<HuntConfig, Box<dyn Error>> {
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config(args.verbose);

    let explicit_path = args
        .config
        .clone()
        .or_else(|| env_config.config.as_ref().map(PathBuf::from));
    if let Some(path) = &explicit_path {
        debug!(path = %path.display(), "using explicit config file");
    }

    let file_config = config_manager.load(explicit_path.as_deref())?;

    let config = file_config.apply_to(HuntConfig::default());
    let config = env_config.apply_to(config);
    apply_cli_args_to_config(config, args)
}

/// Apply CLI arguments to config (highest precedence).
///
/// Only flags the user actually passed override earlier layers.
fn apply_cli_args_to_config(
    mut config: HuntConfig,
    args: &Args,
) -> Result<HuntConfig, Box<dyn Error>> {
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency as usize);
    }
    if let Some(max_archives) = args.max_archives {
        config = config.with_max_archives(max_archives);
    }
    if let Some(limit) = args.snapshot_limit {
        config = config.with_snapshot_limit(limit as usize);
    }
    if let Some(delay) = args.delay_ms {
        config = config.with_download_delay(Duration::from_millis(delay));
    }
    if let Some(timeout) = &args.timeout {
        let timeout = parse_duration_string(timeout).ok_or_else(|| {
            format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout
            )
        })?;
        config = config.with_request_timeout(timeout);
    }
    if args.no_www {
        config = config.with_www_variants(false);
    }
    if args.no_latest {
        config = config.with_latest_capture(false);
    }
    if args.overwrite {
        config = config.with_overwrite(true);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["domhunter", "--domains", "domains.txt"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_untouched_without_flags() {
        let args = parse(&[]);
        assert_eq!(args.out, PathBuf::from("output"));

        let base = HuntConfig::default().with_concurrency(42);
        let config = apply_cli_args_to_config(base, &args).unwrap();
        assert_eq!(config.concurrency, 42);
        assert!(config.include_www_variants);
        assert!(!config.overwrite);
    }

    #[test]
    fn test_cli_flags_override() {
        let args = parse(&[
            "--concurrency",
            "3",
            "--max-archives",
            "2",
            "--snapshot-limit",
            "10",
            "--timeout",
            "5s",
            "--delay-ms",
            "0",
            "--no-www",
            "--no-latest",
            "--overwrite",
        ]);

        let config = apply_cli_args_to_config(HuntConfig::default(), &args).unwrap();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.max_archives, 2);
        assert_eq!(config.snapshot_limit, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.download_delay.is_zero());
        assert!(!config.include_www_variants);
        assert!(!config.include_latest_capture);
        assert!(config.overwrite);
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let args = parse(&["--timeout", "whenever"]);
        assert!(apply_cli_args_to_config(HuntConfig::default(), &args).is_err());
    }

    #[test]
    fn test_concurrency_range_enforced_by_parser() {
        let argv = ["domhunter", "--domains", "d.txt", "--concurrency", "0"];
        assert!(Args::try_parse_from(argv).is_err());

        let argv = ["domhunter", "--domains", "d.txt", "--concurrency", "101"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_spinner_only_replaces_quiet_batch_lines() {
        assert!(show_spinner(true, 5));
        assert!(!show_spinner(true, 1));
        assert!(!show_spinner(false, 5));
    }

    #[test]
    fn test_domains_flag_required() {
        assert!(Args::try_parse_from(["domhunter"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let missing: Box<dyn Error> = Box::new(HuntError::MissingCredentials {
            vars: vec!["GOOGLE_CX".to_string()],
        });
        assert_eq!(exit_code_for(missing.as_ref()), EXIT_MISSING_CREDENTIALS);

        let file: Box<dyn Error> = Box::new(HuntError::file_error("x.txt", "File not found"));
        assert_eq!(exit_code_for(file.as_ref()), EXIT_FAILURE);

        let plain: Box<dyn Error> = "No valid domains".into();
        assert_eq!(exit_code_for(plain.as_ref()), EXIT_FAILURE);
    }
}
