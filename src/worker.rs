//! The crawl engine: one worker walking its assigned date range.
//!
//! A worker processes days strictly in calendar order. Within a day it
//! requests listing pages in increasing page order until the site repeats
//! itself or runs dry, filters and enriches the items it finds, and
//! accumulates records in memory. Whenever the next date crosses into a new
//! month (or past the range end) the accumulated batch is flushed to disk
//! and cleared.
//!
//! All state lives in [`WorkerState`], owned exclusively by one worker;
//! nothing here is shared across workers.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::HarvestConfig;
use crate::error::Result;
use crate::extract;
use crate::fetcher::FetchPage;
use crate::filter::FilterSet;
use crate::models::{ExtractedItem, NewsRecord};
use crate::outputs::csv::flush_batch;
use crate::partition::DateRange;

/// Body text recorded when the article page could not be fetched. The
/// title, timestamp, and match columns are still worth keeping.
const FETCH_FAILED_BODY: &str = "Failed to retrieve content";

/// Body text recorded when the article page has no content element.
const NO_CONTENT_BODY: &str = "No content available";

/// Listing rows show a 12-hour clock with a Korean meridiem marker,
/// e.g. `오후 3:45`.
static CLOCK_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(오전|오후)\s*(\d{1,2}):(\d{2})").unwrap());

/// Per-worker mutable state threaded through the date loop.
#[derive(Debug, Default)]
pub struct WorkerState {
    /// Title list of the previously processed page of the current day.
    pub previous_titles: Option<Vec<String>>,
    /// Records accumulated since the last flush.
    pub batch: Vec<NewsRecord>,
}

/// Whether a freshly extracted page advances pagination.
///
/// An empty title list means the day's listing ran dry. A title list
/// identical to the previous page means the site is echoing its last real
/// page, which is how this endpoint answers page numbers past the end.
pub fn is_new_page(current: &[String], previous: Option<&[String]>) -> bool {
    if current.is_empty() {
        return false;
    }
    match previous {
        Some(previous) => previous != current,
        None => true,
    }
}

/// Combine the walked calendar day with a listing row's raw clock text.
///
/// Returns `None` when the text carries no parseable clock.
pub fn compose_timestamp(day: NaiveDate, raw_time: &str) -> Option<NaiveDateTime> {
    let caps = CLOCK_TOKEN.captures(raw_time)?;
    let hour12: u32 = caps[2].parse().ok()?;
    let minute: u32 = caps[3].parse().ok()?;
    if !(1..=12).contains(&hour12) || minute > 59 {
        return None;
    }
    let hour = match (&caps[1], hour12) {
        ("오후", 12) => 12,
        ("오후", h) => h + 12,
        ("오전", 12) => 0,
        (_, h) => h,
    };
    day.and_hms_opt(hour, minute, 0)
}

/// Filter one listing item and, on a hit, enrich it with the article body.
///
/// Returns `None` for non-matching items and for rows whose clock text is
/// malformed; both leave the rest of the page untouched. Without a filter
/// set every item is a hit and the match columns stay empty. A failed
/// article fetch downgrades the body to a sentinel instead of dropping the
/// record.
pub async fn process_item<F: FetchPage>(
    fetcher: &mut F,
    item: &ExtractedItem,
    day: NaiveDate,
    filter: Option<&FilterSet>,
) -> Option<NewsRecord> {
    let Some(timestamp) = compose_timestamp(day, &item.raw_time) else {
        warn!(
            title = %item.title,
            raw_time = %item.raw_time,
            "Unparseable listing time; skipping item"
        );
        return None;
    };

    let (name, code) = match filter {
        Some(set) => {
            let entry = set.match_title(&item.title)?;
            (Some(entry.name.clone()), Some(entry.code.clone()))
        }
        None => (None, None),
    };

    let content = match fetcher.fetch(&item.link).await {
        Ok(html) => {
            extract::parse_article_content(&html).unwrap_or_else(|| NO_CONTENT_BODY.to_string())
        }
        Err(e) => {
            warn!(url = %item.link, error = %e, "Article fetch failed; keeping record without body");
            FETCH_FAILED_BODY.to_string()
        }
    };

    Some(NewsRecord {
        timestamp,
        name,
        code,
        title: item.title.clone(),
        content,
    })
}

/// Walk one calendar day's listing pages until they stop producing new
/// titles. Returns the number of records appended to the batch.
///
/// A fetch that exhausts its retries ends the day; records collected from
/// earlier pages of the same day are kept.
#[instrument(level = "debug", skip_all, fields(day = %day))]
pub async fn scrape_day<F: FetchPage>(
    fetcher: &mut F,
    config: &HarvestConfig,
    filter: Option<&FilterSet>,
    state: &mut WorkerState,
    day: NaiveDate,
) -> usize {
    state.previous_titles = None;
    let date_param = day.format("%Y%m%d").to_string();
    let mut appended = 0usize;
    let mut page = 1u32;

    loop {
        let url = format!("{}&date={}&page={}", config.base_url, date_param, page);
        let html = match fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(page, error = %e, "Giving up on listing page; moving to the next date");
                break;
            }
        };

        let listing = extract::parse_listing(&html, &config.base_url);
        if !is_new_page(&listing.titles, state.previous_titles.as_deref()) {
            debug!(page, "No new titles on this page; day exhausted");
            break;
        }
        state.previous_titles = Some(listing.titles);

        for item in &listing.items {
            if let Some(record) = process_item(fetcher, item, day, filter).await {
                state.batch.push(record);
                appended += 1;
            }
        }

        debug!(page, batch = state.batch.len(), "Listing page processed");
        page += 1;
        sleep(config.inter_page_delay()).await;
    }

    appended
}

/// Walk an assigned sub-range day by day.
///
/// The batch is flushed whenever the next date starts a new month or falls
/// past the range end, and once more after the loop for any remainder.
/// Flush failures abort this worker; fetch and parse trouble never do.
#[instrument(level = "info", skip_all, fields(worker_id = worker_id, start = %range.start, end = %range.end))]
pub async fn run_range<F: FetchPage>(
    fetcher: &mut F,
    config: &HarvestConfig,
    filter: Option<&FilterSet>,
    range: DateRange,
    worker_id: usize,
) -> Result<usize> {
    let mut state = WorkerState::default();
    let mut total = 0usize;
    let mut day = range.start;

    while day <= range.end {
        info!(worker_id, day = %day, "Scraping date");
        total += scrape_day(fetcher, config, filter, &mut state, day).await;

        let next = day + Days::new(1);
        if next.day() == 1 || next > range.end {
            flush_batch(&mut state.batch, &config.output_dir, range.start, day, worker_id).await?;
        }
        day = next;
    }

    if !state.batch.is_empty() {
        flush_batch(
            &mut state.batch,
            &config.output_dir,
            range.start,
            range.end,
            worker_id,
        )
        .await?;
    }

    Ok(total)
}
