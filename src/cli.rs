//! Command-line interface definitions for the news harvester.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Network-facing options can also be provided via environment variables.

use chrono::NaiveDate;
use clap::Parser;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

/// Command-line arguments for one harvest run.
///
/// A run walks the inclusive `[start_date, end_date]` range, one worker per
/// calendar month, and writes date-bounded CSV batches into the output
/// directory.
///
/// # Examples
///
/// ```sh
/// # Harvest a quarter, keeping only articles matching the filter file
/// naver_news_harvest -s 2023-01-15 -e 2023-03-10 -f kospi.csv
///
/// # Harvest everything (no filter), with a randomized inter-page pause
/// naver_news_harvest -s 2015-01-01 -e 2015-12-31 \
///     --page-delay-secs 5 --page-delay-max-secs 10
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// First calendar day of the harvest range (YYYY-MM-DD)
    #[arg(short, long)]
    pub start_date: NaiveDate,

    /// Last calendar day of the harvest range (YYYY-MM-DD), inclusive
    #[arg(short, long)]
    pub end_date: NaiveDate,

    /// Output directory for the CSV batch files
    #[arg(short, long, default_value = "data_news")]
    pub output_dir: String,

    /// CSV file of `code,name` filter entries; omit to keep every article
    #[arg(short, long, env = "FILTER_FILE")]
    pub filter_file: Option<String>,

    /// Maximum number of month workers running at once
    #[arg(long, default_value_t = 6)]
    pub max_workers: usize,

    /// Pause between listing pages of the same day, in seconds
    #[arg(long, default_value_t = 5.0)]
    pub page_delay_secs: f64,

    /// Upper bound for a randomized inter-page pause; omit for a fixed pause
    #[arg(long)]
    pub page_delay_max_secs: Option<f64>,

    /// Seconds a network session may live before it is replaced
    #[arg(long, default_value_t = 1800)]
    pub session_max_age_secs: u64,

    /// Listing endpoint; `&date=YYYYMMDD&page=N` is appended per request
    #[arg(long, env = "NEWS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// User agent header sent with every request
    #[arg(long, env = "NEWS_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "naver_news_harvest",
            "--start-date",
            "2023-01-15",
            "--end-date",
            "2023-03-10",
            "--output-dir",
            "./out",
        ]);

        assert_eq!(cli.start_date, NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
        assert_eq!(cli.end_date, NaiveDate::from_ymd_opt(2023, 3, 10).unwrap());
        assert_eq!(cli.output_dir, "./out");
        assert_eq!(cli.max_workers, 6);
        assert!(cli.filter_file.is_none());
        assert!(cli.page_delay_max_secs.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "naver_news_harvest",
            "-s",
            "2015-01-01",
            "-e",
            "2015-12-31",
            "-f",
            "kospi.csv",
        ]);

        assert_eq!(cli.filter_file.as_deref(), Some("kospi.csv"));
        assert_eq!(cli.output_dir, "data_news");
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_cli_rejects_malformed_date() {
        let result = Cli::try_parse_from([
            "naver_news_harvest",
            "-s",
            "2023-13-01",
            "-e",
            "2023-12-31",
        ]);
        assert!(result.is_err());
    }
}
