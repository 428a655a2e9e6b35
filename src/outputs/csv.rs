//! CSV persistence for the batch checkpointer.
//!
//! A batch is serialized fully in memory and written with a single call;
//! a failed flush therefore never leaves a partial file behind.

use std::path::PathBuf;

use chrono::NaiveDate;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::{HarvestError, Result};
use crate::models::NewsRecord;

/// Deterministic file name for one (range, segment, worker) key.
pub fn batch_filename(range_start: NaiveDate, segment_end: NaiveDate, worker_id: usize) -> String {
    format!("news_{range_start}_to_{segment_end}_proc_{worker_id}.csv")
}

/// Sort the batch newest-first, write it as one CSV file, and clear it.
///
/// Empty batches are skipped. Returns the path written, if any.
#[instrument(level = "info", skip_all, fields(worker_id = worker_id, segment_end = %segment_end))]
pub async fn flush_batch(
    batch: &mut Vec<NewsRecord>,
    output_dir: &str,
    range_start: NaiveDate,
    segment_end: NaiveDate,
    worker_id: usize,
) -> Result<Option<PathBuf>> {
    if batch.is_empty() {
        return Ok(None);
    }

    batch.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in batch.iter() {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| HarvestError::Io(e.into_error()))?;

    let path = PathBuf::from(output_dir).join(batch_filename(range_start, segment_end, worker_id));
    fs::write(&path, bytes).await?;

    info!(path = %path.display(), records = batch.len(), "Flushed batch");
    batch.clear();
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(day: u32, hour: u32, title: &str) -> NewsRecord {
        NewsRecord {
            timestamp: ts(day, hour),
            name: None,
            code: None,
            title: title.to_string(),
            content: "body".to_string(),
        }
    }

    fn range_bounds() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_flush_writes_sorted_file_and_clears_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let (start, end) = range_bounds();
        let mut batch = vec![
            record(16, 9, "older"),
            record(20, 18, "newest"),
            record(18, 12, "middle"),
        ];

        let path = flush_batch(&mut batch, tmp.path().to_str().unwrap(), start, end, 2)
            .await
            .unwrap()
            .unwrap();

        assert!(batch.is_empty());
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "news_2023-01-15_to_2023-01-31_proc_2.csv"
        );

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("newest"));
        assert!(lines[2].contains("middle"));
        assert!(lines[3].contains("older"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let (start, end) = range_bounds();
        let mut batch = Vec::new();

        let path = flush_batch(&mut batch, tmp.path().to_str().unwrap(), start, end, 0)
            .await
            .unwrap();

        assert!(path.is_none());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_rerun_overwrites_cleanly_instead_of_merging() {
        let tmp = tempfile::tempdir().unwrap();
        let (start, end) = range_bounds();

        let mut first = vec![record(16, 9, "only")];
        let first_path = flush_batch(&mut first, tmp.path().to_str().unwrap(), start, end, 0)
            .await
            .unwrap()
            .unwrap();
        let first_content = std::fs::read_to_string(&first_path).unwrap();

        let mut second = vec![record(16, 9, "only")];
        let second_path = flush_batch(&mut second, tmp.path().to_str().unwrap(), start, end, 0)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first_path, second_path);
        let second_content = std::fs::read_to_string(&second_path).unwrap();
        assert_eq!(first_content, second_content);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
