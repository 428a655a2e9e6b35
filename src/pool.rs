//! The worker pool: one worker per calendar-month sub-range.
//!
//! Workers are fully independent — each owns its session, its state, and
//! its output files — so the only coordination point is the concurrency
//! gate bounding how many run at once. A worker that fails leaves its
//! sub-range incomplete and its siblings untouched; the summary names the
//! range so the operator can re-run just that slice.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use rand::{Rng, rng};
use tokio::time::sleep;
use tracing::{error, info};

use crate::config::HarvestConfig;
use crate::error::Result;
use crate::fetcher::{RetryFetch, SessionFetcher};
use crate::filter::FilterSet;
use crate::partition::DateRange;
use crate::worker;

/// Outcome of one pool run.
#[derive(Debug, Default)]
pub struct PoolSummary {
    pub workers: usize,
    pub failed: usize,
    pub records: usize,
}

/// Run every sub-range to completion, at most `max_workers` at a time.
pub async fn run(
    config: Arc<HarvestConfig>,
    filter: Option<Arc<FilterSet>>,
    ranges: Vec<DateRange>,
    max_workers: usize,
) -> PoolSummary {
    let total = ranges.len();
    info!(sub_ranges = total, max_workers, "Starting worker pool");

    let results: Vec<(usize, DateRange, Result<usize>)> =
        stream::iter(ranges.into_iter().enumerate())
            .map(|(worker_id, range)| {
                let config = Arc::clone(&config);
                let filter = filter.clone();
                async move {
                    let outcome = run_worker(&config, filter.as_deref(), range, worker_id).await;
                    (worker_id, range, outcome)
                }
            })
            .buffer_unordered(max_workers)
            .collect()
            .await;

    let mut summary = PoolSummary {
        workers: total,
        ..Default::default()
    };
    for (worker_id, range, outcome) in results {
        match outcome {
            Ok(records) => {
                info!(worker_id, start = %range.start, end = %range.end, records, "Worker finished");
                summary.records += records;
            }
            Err(e) => {
                error!(
                    worker_id,
                    start = %range.start,
                    end = %range.end,
                    error = %e,
                    "Worker failed; its sub-range is incomplete and safe to re-run"
                );
                summary.failed += 1;
            }
        }
    }
    summary
}

async fn run_worker(
    config: &HarvestConfig,
    filter: Option<&FilterSet>,
    range: DateRange,
    worker_id: usize,
) -> Result<usize> {
    // stagger first requests so the pool doesn't open with a burst
    let jitter = Duration::from_secs_f64(rng().random_range(1.0..5.0));
    info!(
        worker_id,
        start = %range.start,
        end = %range.end,
        jitter_ms = jitter.as_millis() as u64,
        "Worker starting after launch jitter"
    );
    sleep(jitter).await;

    let session = SessionFetcher::new(&config.user_agent, config.session_max_age)?;
    let mut fetcher = RetryFetch::with_defaults(session);
    worker::run_range(&mut fetcher, config, filter, range, worker_id).await
}
