//! The stock filter: `(code, name)` pairs matched against article titles.
//!
//! The filter set arrives as a CSV file with `code,name` columns, one row
//! per listed stock. An article matches when its title contains any entry's
//! code or name as a substring. Without a filter set, the harvester keeps
//! every article.

use itertools::Itertools;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

/// One listed stock: the exchange code and the display name.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterEntry {
    pub code: String,
    pub name: String,
}

/// The configured set of stocks worth keeping articles for.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    entries: Vec<FilterEntry>,
}

impl FilterSet {
    /// Build a filter set, dropping duplicate codes while preserving order.
    pub fn from_entries(entries: Vec<FilterEntry>) -> Self {
        let entries: Vec<FilterEntry> = entries
            .into_iter()
            .unique_by(|entry| entry.code.clone())
            .collect();
        Self { entries }
    }

    /// Load a `code,name` CSV file (header row expected).
    pub fn from_csv_path(path: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut entries = Vec::new();
        for row in reader.deserialize() {
            entries.push(row?);
        }
        debug!(path, entries = entries.len(), "Read filter file");
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose code or name appears in the title, if any.
    pub fn match_title(&self, title: &str) -> Option<&FilterEntry> {
        self.entries
            .iter()
            .find(|entry| title.contains(&entry.code) || title.contains(&entry.name))
    }
}
