//! # Naver News Harvest
//!
//! An incremental harvester for date-paginated news listing pages. It walks
//! a requested date range one calendar month per worker, pages through each
//! day's listing until the site repeats itself, keeps the articles matching
//! a configured stock filter (or all of them), and checkpoints the results
//! as date-bounded CSV batches.
//!
//! ## Usage
//!
//! ```sh
//! naver_news_harvest -s 2023-01-15 -e 2023-03-10 -f kospi.csv -o data_news
//! ```
//!
//! ## Architecture
//!
//! 1. **Partitioning**: the overall range is split into calendar-month
//!    sub-ranges, one worker each
//! 2. **Crawling**: each worker walks its days, paginating until a page
//!    repeats or runs dry, with bounded retry and session rotation
//! 3. **Enrichment**: matched items get one extra fetch for the article body
//! 4. **Checkpointing**: batches are flushed at month boundaries and at the
//!    end of the range, newest records first

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extract;
mod fetcher;
mod filter;
mod models;
mod outputs;
mod partition;
mod pool;
mod utils;
mod worker;

use cli::Cli;
use config::HarvestConfig;
use filter::FilterSet;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_harvest starting up");

    let args = Cli::parse();
    if args.start_date > args.end_date {
        error!(start = %args.start_date, end = %args.end_date, "Start date is after end date");
        return Err("start date must not be after end date".into());
    }

    // Early check: ensure the output dir is writable before any worker runs
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let filter_set = match &args.filter_file {
        Some(path) => {
            let set = FilterSet::from_csv_path(path)?;
            if set.is_empty() {
                warn!(path = %path, "Filter file contains no entries; nothing would ever match");
            }
            info!(path = %path, entries = set.len(), "Loaded filter entries");
            Some(Arc::new(set))
        }
        None => {
            info!("No filter file given; harvesting every article");
            None
        }
    };

    let ranges = partition::month_partitions(args.start_date, args.end_date);
    info!(
        start = %args.start_date,
        end = %args.end_date,
        sub_ranges = ranges.len(),
        "Partitioned harvest range by calendar month"
    );

    let max_workers = args.max_workers;
    let config = Arc::new(HarvestConfig::from_cli(&args));
    let summary = pool::run(config, filter_set, ranges, max_workers).await;

    let elapsed = start_time.elapsed();
    info!(
        workers = summary.workers,
        failed = summary.failed,
        records = summary.records,
        secs = elapsed.as_secs(),
        "Harvest complete"
    );
    if summary.failed > 0 {
        warn!(
            failed = summary.failed,
            "Some sub-ranges are incomplete; re-run them with the same date bounds"
        );
    }

    Ok(())
}
