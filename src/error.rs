//! Crate-wide error type and result alias.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, HarvestError>;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gave up fetching {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: usize },

    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}
