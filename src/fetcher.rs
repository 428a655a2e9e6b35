//! Page fetching with bounded retry and periodic session rotation.
//!
//! # Architecture
//!
//! The module uses a trait-based design so the crawl engine can be driven
//! by a mock in tests:
//! - [`FetchPage`]: core trait for fetching one URL's body
//! - [`SessionFetcher`]: long-lived `reqwest` session that replaces itself
//!   after a configured age budget
//! - [`RetryFetch`]: decorator that adds bounded exponential backoff to any
//!   `FetchPage` implementation
//!
//! # Retry Strategy
//!
//! - Exactly 5 attempts per URL
//! - Waits double from a 1 second base: 1, 2, 4, 8, 16
//! - A wait follows every failed attempt; after the last one the URL is
//!   given up with [`HarvestError::RetriesExhausted`]
//!
//! The caller treats an exhausted URL as "no page" and ends the current
//! day's pagination rather than retrying the whole day.

use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{HarvestError, Result};

/// Attempts per URL before giving up.
pub const MAX_FETCH_ATTEMPTS: usize = 5;

/// First retry wait; doubles with each failure.
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for fetching the textual body of one URL.
///
/// Takes `&mut self` because real implementations mutate session state.
pub trait FetchPage {
    async fn fetch(&mut self, url: &str) -> Result<String>;
}

/// A reusable network session that rotates itself after an age budget.
///
/// The underlying `reqwest::Client` pools connections, so keeping one alive
/// across many requests is what makes the harvester polite. Sites tend to
/// degrade very long-lived sessions, hence the rotation: before issuing a
/// request, a session older than `max_session_age` is dropped and replaced.
/// Rotation is independent of whether the triggering request succeeds.
pub struct SessionFetcher {
    client: Client,
    opened_at: Instant,
    user_agent: String,
    max_session_age: Duration,
}

impl SessionFetcher {
    pub fn new(user_agent: &str, max_session_age: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent)?,
            opened_at: Instant::now(),
            user_agent: user_agent.to_string(),
            max_session_age,
        })
    }

    fn rotate_if_stale(&mut self) -> Result<()> {
        let age = self.opened_at.elapsed();
        if age > self.max_session_age {
            info!(age_secs = age.as_secs(), "Session age budget exceeded; rotating session");
            self.client = build_client(&self.user_agent)?;
            self.opened_at = Instant::now();
        }
        Ok(())
    }
}

fn build_client(user_agent: &str) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

impl FetchPage for SessionFetcher {
    async fn fetch(&mut self, url: &str) -> Result<String> {
        self.rotate_if_stale()?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Wrapper that adds bounded exponential backoff to any [`FetchPage`].
pub struct RetryFetch<T> {
    inner: T,
    max_attempts: usize,
    base_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: FetchPage,
{
    pub fn new(inner: T, max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_attempts,
            base_delay,
        }
    }

    pub fn with_defaults(inner: T) -> Self {
        Self::new(inner, MAX_FETCH_ATTEMPTS, RETRY_BASE_DELAY)
    }
}

impl<T> FetchPage for RetryFetch<T>
where
    T: FetchPage,
{
    async fn fetch(&mut self, url: &str) -> Result<String> {
        let mut wait = self.base_delay;

        for attempt in 1..=self.max_attempts {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!(
                        attempt,
                        max = self.max_attempts,
                        %url,
                        ?wait,
                        error = %e,
                        "Fetch attempt failed; backing off"
                    );
                    sleep(wait).await;
                    wait = wait.saturating_mul(2);
                }
            }
        }

        Err(HarvestError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Fails the first `failures` calls, then succeeds.
    struct FlakyFetch {
        failures: usize,
        calls: usize,
    }

    impl FetchPage for FlakyFetch {
        async fn fetch(&mut self, _url: &str) -> Result<String> {
            self.calls += 1;
            if self.calls <= self.failures {
                Err(HarvestError::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset",
                )))
            } else {
                Ok("body".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_always_failing_fetch_stops_after_five_attempts() {
        let inner = FlakyFetch {
            failures: usize::MAX,
            calls: 0,
        };
        let mut fetcher = RetryFetch::new(inner, MAX_FETCH_ATTEMPTS, Duration::from_millis(1));

        let err = fetcher.fetch("http://example.invalid/listing").await.unwrap_err();
        match err {
            HarvestError::RetriesExhausted { url, attempts } => {
                assert_eq!(url, "http://example.invalid/listing");
                assert_eq!(attempts, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fetcher.inner.calls, 5);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let inner = FlakyFetch {
            failures: 2,
            calls: 0,
        };
        let mut fetcher = RetryFetch::new(inner, MAX_FETCH_ATTEMPTS, Duration::from_millis(1));

        let body = fetcher.fetch("http://example.invalid/listing").await.unwrap();
        assert_eq!(body, "body");
        assert_eq!(fetcher.inner.calls, 3);
    }

    #[tokio::test]
    async fn test_waits_double_from_the_base() {
        let inner = FlakyFetch {
            failures: usize::MAX,
            calls: 0,
        };
        let base = Duration::from_millis(2);
        let mut fetcher = RetryFetch::new(inner, MAX_FETCH_ATTEMPTS, base);

        let started = Instant::now();
        let _ = fetcher.fetch("http://example.invalid/listing").await;
        // 2 + 4 + 8 + 16 + 32 ms of backoff
        assert!(started.elapsed() >= Duration::from_millis(62));
    }
}
