//! CLI parsing and orchestration. Parses args, runs a fresh crawl or a
//! catalog reconciliation, and maps errors to exit codes.

use crate::catalog::{Catalog, CatalogError};
use crate::config;
use crate::download::{DownloadOrchestrator, DownloadOutcome};
use crate::model::BookRecord;
use crate::reconcile;
use crate::scrape::listing::{ListingScanner, PAGE_CAPACITY};
use crate::scrape::patterns::Patterns;
use crate::scrape::resolver::{ItemResolver, DEFAULT_TOPIC};
use crate::scrape::{Fetch, PoliteClient, ScrapeError};
use clap::{ArgAction, Parser};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scrape(#[from] ScrapeError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scrape(_) => 2,
            CliRunError::Catalog(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "openshelf")]
#[command(about = "Download Springer open-access books into a topic-sorted library")]
#[command(
    after_help = "Config file keys (user_agent, request_delay_secs, timeout_secs, retry_count, retry_backoff_secs, default_topic, catalog_name) are documented in the README. CLI flags override config."
)]
pub struct Args {
    /// Library root directory; topic folders and PDFs are written under it.
    pub path: PathBuf,

    /// Number of listing pages to scan. Read from the listing itself when omitted.
    #[arg(short, long)]
    pub pages: Option<u32>,

    /// Reconcile an existing catalog CSV against the live listing and fetch
    /// only the entries it is missing.
    #[arg(short = 'C', long, value_name = "CATALOG_CSV")]
    pub check: Option<PathBuf>,

    /// Write a catalog CSV into the library root after the crawl.
    #[arg(short = 'D', long)]
    pub catalog: bool,

    /// Print diagnostic detail (-v per-book lines, -vv operational detail).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the progress bar (warnings and the final report only).
    #[arg(short, long)]
    pub quiet: bool,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Delay between requests in seconds (overrides config; default 2).
    #[arg(long)]
    pub delay: Option<u64>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Topic label for books whose detail page declares no subject
    /// (overrides config).
    #[arg(long)]
    pub default_topic: Option<String>,
}

/// Print a diagnostic line when the requested verbosity reaches `level`.
/// Verbosity only adds output; it never changes what the run does.
fn note(verbosity: u8, level: u8, msg: &str) {
    if level <= verbosity {
        eprintln!("{}", msg);
    }
}

/// Counters for the final report.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub resolved: usize,
    pub resolve_failures: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub download_failures: usize,
}

/// One line enumerating what the run did; printed unconditionally.
fn summary(pages: u32, short_pages: usize, targeted: usize, counts: &RunCounts) -> String {
    format!(
        "Scanned {} listing page(s) ({} short); targeted {} item(s): {} resolved ({} failed), {} downloaded, {} already present, {} download failure(s).",
        pages,
        short_pages,
        targeted,
        counts.resolved,
        counts.resolve_failures,
        counts.downloaded,
        counts.already_present,
        counts.download_failures,
    )
}

/// Resolve and download each targeted item. Per-item failures are logged
/// and counted, never propagated: one broken item must not abort a
/// multi-hundred-item crawl. Every resolved record is handed to `on_record`.
fn process_items<F: Fetch>(
    fetcher: &mut F,
    resolver: &ItemResolver<'_>,
    downloads: &mut DownloadOrchestrator,
    todo: &[String],
    verbosity: u8,
    progress: Option<&indicatif::ProgressBar>,
    mut on_record: impl FnMut(&BookRecord),
) -> RunCounts {
    let mut counts = RunCounts::default();
    for item_link in todo {
        if let Some(bar) = progress {
            bar.set_message(item_link.clone());
        }

        let record = match resolver.resolve(fetcher, item_link) {
            Ok(record) => record,
            Err(e) => {
                eprintln!("Skipping {}: {}", item_link, e);
                counts.resolve_failures += 1;
                if let Some(bar) = progress {
                    bar.inc(1);
                }
                continue;
            }
        };
        counts.resolved += 1;
        note(
            verbosity,
            1,
            &format!(
                "Resolved '{}' ({}) by {}",
                record.title,
                record.topic,
                record
                    .authors
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        );

        match downloads.ensure_downloaded(fetcher, &record) {
            Ok(DownloadOutcome::Downloaded(path)) => {
                counts.downloaded += 1;
                note(verbosity, 1, &format!("Fetched {}", path.display()));
            }
            Ok(DownloadOutcome::AlreadyPresent(path)) => {
                counts.already_present += 1;
                note(verbosity, 2, &format!("Already have {}", path.display()));
            }
            Err(e) => {
                counts.download_failures += 1;
                eprintln!("{}", e);
            }
        }

        on_record(&record);
        if let Some(bar) = progress {
            bar.inc(1);
        }
    }
    counts
}

fn make_progress_bar(len: usize) -> indicatif::ProgressBar {
    let bar = indicatif::ProgressBar::new(len as u64);
    bar.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .progress_chars("█▉▊▋▌▍▎▏ "),
    );
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code
/// and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    if !args.path.is_dir() {
        return Err(CliRunError::InvalidInput(format!(
            "Library root {} is not an existing directory.",
            args.path.display()
        )));
    }
    if args.pages == Some(0) {
        return Err(CliRunError::InvalidInput(
            "--pages must be at least 1.".to_string(),
        ));
    }

    let config = config::load_config().map_err(CliRunError::InvalidInput)?;

    const DEFAULT_DELAY_SECS: u64 = 2;
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_RETRY_COUNT: u32 = 3;
    let delay_secs = args
        .delay
        .or_else(|| config.as_ref().and_then(|c| c.request_delay_secs))
        .unwrap_or(DEFAULT_DELAY_SECS);
    let timeout_secs = args
        .timeout
        .or_else(|| config.as_ref().and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let retry_count = config
        .as_ref()
        .and_then(|c| c.retry_count)
        .unwrap_or(DEFAULT_RETRY_COUNT)
        .max(1);
    let retry_backoff_secs = config
        .as_ref()
        .and_then(|c| c.retry_backoff_secs.clone())
        .unwrap_or_else(|| vec![1, 2]);
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.user_agent.clone()));
    let default_topic = args
        .default_topic
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.default_topic.clone()))
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
    let catalog_name = config
        .as_ref()
        .and_then(|c| c.catalog_name.clone())
        .unwrap_or_else(|| "catalog".to_string());

    let mut builder = PoliteClient::builder()
        .delay_secs(delay_secs)
        .timeout_secs(timeout_secs)
        .retry_count(retry_count)
        .retry_backoff_secs(retry_backoff_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let mut client = builder.build()?;

    let patterns = Patterns::new()?;
    let scanner = ListingScanner::new(&patterns);

    // Check mode loads the catalog (and rejects a bad one) before any
    // network traffic.
    let mut persisted: Option<Catalog> = match &args.check {
        Some(path) => Some(Catalog::load(path)?),
        None => None,
    };

    let pages = match args.pages {
        Some(p) => p,
        None => {
            let p = scanner.discover_page_count(&mut client)?;
            note(args.verbose, 2, &format!("Listing reports {} page(s).", p));
            p
        }
    };

    let scan = scanner.scan(&mut client, pages)?;
    for page in &scan.short_pages {
        eprintln!(
            "Warning: listing page {} yielded fewer than {} book links; check it for missing entries.",
            page, PAGE_CAPACITY
        );
    }

    let todo: Vec<String> = match &persisted {
        Some(catalog) => {
            let live: BTreeSet<String> = scan.links.iter().cloned().collect();
            let new = reconcile::diff(&live, &catalog.known_item_links());
            note(
                args.verbose,
                2,
                &format!("{} live link(s), {} new.", live.len(), new.len()),
            );
            new.into_iter().collect()
        }
        None => reconcile::dedup_in_order(scan.links),
    };

    let progress = if args.quiet || todo.is_empty() {
        None
    } else {
        Some(make_progress_bar(todo.len()))
    };

    let resolver = ItemResolver::new(&patterns, &default_topic);
    let mut downloads = DownloadOrchestrator::new(&args.path);
    let mut fresh_records: Vec<BookRecord> = Vec::new();

    let counts = {
        let persisted = &mut persisted;
        let fresh_records = &mut fresh_records;
        let bookpath = args.path.clone();
        process_items(
            &mut client,
            &resolver,
            &mut downloads,
            &todo,
            args.verbose,
            progress.as_ref(),
            move |record| match persisted.as_mut() {
                Some(catalog) => {
                    catalog.push_record(record, &bookpath);
                }
                None => fresh_records.push(record.clone()),
            },
        )
    };

    if let Some(bar) = progress {
        bar.disable_steady_tick();
        bar.finish_and_clear();
    }

    let catalog_path = args.path.join(format!("{}.csv", catalog_name));
    if let Some(catalog) = &persisted {
        catalog.save(&catalog_path)?;
        note(
            args.verbose,
            1,
            &format!("Catalog updated at {}.", catalog_path.display()),
        );
    } else if args.catalog {
        Catalog::from_records(fresh_records.iter(), &args.path).save(&catalog_path)?;
        note(
            args.verbose,
            1,
            &format!("Catalog written to {}.", catalog_path.display()),
        );
    }

    eprintln!(
        "{}",
        summary(pages, scan.short_pages.len(), todo.len(), &counts)
    );
    Ok(())
}
