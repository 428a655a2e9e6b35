//! Data models for listing pages and persisted news records.
//!
//! - [`ExtractedItem`]: one row of a listing page, before filtering
//! - [`ListingPage`]: everything pulled from one fetched listing page
//! - [`NewsRecord`]: a matched, enriched article as it is persisted
//!
//! `NewsRecord` derives `Serialize` so the CSV writer can emit it directly;
//! the serde field order defines the CSV column order.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// One candidate row extracted from a listing page.
///
/// Transient: produced by the page extractor and consumed immediately by the
/// filter. `raw_time` is the untouched clock text from the listing markup.
#[derive(Debug, Clone)]
pub struct ExtractedItem {
    pub title: String,
    pub link: String,
    pub raw_time: String,
}

/// The result of extracting one fetched listing page.
///
/// `titles` preserves page order and is what duplicate-page detection
/// compares; `items` carries the same rows with their links and timestamps.
#[derive(Debug, Default)]
pub struct ListingPage {
    pub titles: Vec<String>,
    pub items: Vec<ExtractedItem>,
}

/// A matched article as it lands in the CSV output.
///
/// `name`/`code` are the filter entry that matched the title; both stay
/// empty when no filter is configured.
#[derive(Debug, Clone, Serialize)]
pub struct NewsRecord {
    #[serde(serialize_with = "timestamp_as_string")]
    pub timestamp: NaiveDateTime,
    pub name: Option<String>,
    pub code: Option<String>,
    pub title: String,
    pub content: String,
}

fn timestamp_as_string<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&timestamp.format("%Y-%m-%d %H:%M:%S"))
}
