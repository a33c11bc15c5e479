//! Terminal display for the domhunter CLI.
//!
//! Colored per-domain lines, the stderr spinner, the run header and the
//! final summary. Uses only the `console` crate.

use console::{pad_str, style, Alignment, Term};
use domhunter_lib::{Availability, DomainResult, Indexation};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner, or nothing when stderr is not a terminal.
    pub fn start(message: String) -> Option<Self> {
        if !Term::stderr().is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

pub fn print_header(domain_count: usize, concurrency: usize, max_archives: usize) {
    println!(
        "{} {} {}",
        style("domhunter").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Hunting {} domain{}",
            domain_count,
            plural(domain_count)
        ))
        .dim(),
    );
    println!(
        "{}",
        style(format!(
            "Concurrency: {} | Max archives: {}",
            concurrency, max_archives
        ))
        .dim()
    );
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

/// Print one completed domain with a `[i/n]` completion counter.
pub fn print_result(result: &DomainResult, counter: (usize, usize)) {
    let padded_domain = pad_str(&result.domain, 30, Alignment::Left, Some(".."));
    let prefix = style(format!("[{}/{}]", counter.0, counter.1)).dim();

    let status = match result.available {
        Availability::Available => style("AVAILABLE").green().bold(),
        Availability::Unavailable => style("TAKEN").red().bold(),
        Availability::Unknown => style("UNKNOWN").yellow(),
    };

    let detail = result_detail(result);
    let detail = if detail.is_empty() {
        String::new()
    } else {
        format!("  {}", style(detail).dim())
    };

    println!(
        "  {} {}  {}{}",
        prefix,
        style(&padded_domain).white(),
        status,
        detail
    );

    if !result.notes.is_empty() {
        println!("    {} {}", style("└─").dim(), style(&result.notes).yellow());
    }
}

/// Short description of how far the chain got for an available domain.
fn result_detail(result: &DomainResult) -> String {
    if result.available != Availability::Available {
        return String::new();
    }
    match result.indexed {
        Indexation::Indexed => format!(
            "indexed, {} page{} archived",
            result.archived_page_count,
            plural(result.archived_page_count)
        ),
        Indexation::NotIndexed => "not indexed".to_string(),
        Indexation::Unknown => "index unknown".to_string(),
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Counters accumulated while results stream in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub available: usize,
    pub taken: usize,
    pub unknown: usize,
    pub indexed: usize,
    pub archived_pages: usize,
}

impl RunStats {
    pub fn record(&mut self, result: &DomainResult) {
        self.total += 1;
        match result.available {
            Availability::Available => self.available += 1,
            Availability::Unavailable => self.taken += 1,
            Availability::Unknown => self.unknown += 1,
        }
        if result.indexed.is_indexed() {
            self.indexed += 1;
        }
        self.archived_pages += result.archived_page_count;
    }
}

/// Print the final summary bar with colored counts.
pub fn print_summary(stats: &RunStats, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(stats.total).bold(),
        plural(stats.total),
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", stats.available)).green(),
        style("|").dim(),
        style(format!("{} taken", stats.taken)).red(),
        style("|").dim(),
        style(format!("{} unknown", stats.unknown)).yellow(),
    );
    println!(
        "  {} indexed  {}  {} archived page{}",
        stats.indexed,
        style("|").dim(),
        stats.archived_pages,
        plural(stats.archived_pages),
    );
}

/// Print where results were written.
pub fn print_outputs(json_path: &Path, csv_path: &Path, archive_root: &Path) {
    println!();
    println!("  {} {}", style("JSON:").bold(), json_path.display());
    println!("  {} {}", style("CSV:").bold(), csv_path.display());
    println!("  {} {}", style("Archives:").bold(), archive_root.display());
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
