//! Immutable run configuration shared by every worker.
//!
//! Everything the crawl engine needs to know about its environment — the
//! listing endpoint, request identity, pacing, and where batches land — is
//! collected here once at startup and passed by reference afterwards. No
//! component reads globals.

use std::time::Duration;

use rand::{Rng, rng};

use crate::cli::Cli;

/// Default listing endpoint: the securities section of the news site, in
/// title-list mode. `&date=YYYYMMDD&page=N` is appended per request.
pub const DEFAULT_BASE_URL: &str =
    "https://news.naver.com/main/list.naver?mode=LS2D&mid=sec&sid1=101&sid2=258&listType=title";

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/104.0.5112.79 Safari/537.36";

/// Settings shared read-only by the whole pool.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Listing endpoint with its fixed query parameters.
    pub base_url: String,
    /// User agent header for the long-lived sessions.
    pub user_agent: String,
    /// Directory receiving the CSV batch files.
    pub output_dir: String,
    /// Pause between consecutive listing pages of the same day.
    pub page_delay: Duration,
    /// Upper bound for a randomized inter-page pause. `None` keeps the
    /// pause fixed at `page_delay`.
    pub page_delay_max: Option<Duration>,
    /// How long a session may live before it is rotated.
    pub session_max_age: Duration,
}

impl HarvestConfig {
    pub fn from_cli(args: &Cli) -> Self {
        Self {
            base_url: args.base_url.clone(),
            user_agent: args.user_agent.clone(),
            output_dir: args.output_dir.clone(),
            page_delay: Duration::from_secs_f64(args.page_delay_secs),
            page_delay_max: args.page_delay_max_secs.map(Duration::from_secs_f64),
            session_max_age: Duration::from_secs(args.session_max_age_secs),
        }
    }

    /// The pause applied between listing pages. With an upper bound
    /// configured the pause is sampled uniformly from the range; this is
    /// deliberate rate limiting, unrelated to retry backoff.
    pub fn inter_page_delay(&self) -> Duration {
        match self.page_delay_max {
            Some(max) if max > self.page_delay => {
                let secs = rng().random_range(self.page_delay.as_secs_f64()..=max.as_secs_f64());
                Duration::from_secs_f64(secs)
            }
            _ => self.page_delay,
        }
    }
}
