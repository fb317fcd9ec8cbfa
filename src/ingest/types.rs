// src/ingest/types.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categories::CategoryConfig;

/// Canonical item shape shared by both acquisition paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub title: Option<String>,
    pub url: String,    // identity key
    pub source: String, // feed label or www-stripped host
    pub published_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub summary: Option<String>,
}

/// What the markup scraper pulls out of one `<item>` or `<entry>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
}

/// A single hit as returned by the search API.
///
/// Providers disagree on field names and some send several at once, so every
/// spelling gets its own slot. The accessors pick the first non-blank one.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub link: Option<String>,
    pub published_at: Option<String>,
    pub date: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
    pub snippet: Option<String>,
    pub description: Option<String>,
}

fn first_filled<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .filter_map(Option::as_deref)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

impl SearchHit {
    /// `url`, else `link`.
    pub fn target(&self) -> Option<&str> {
        first_filled(&[&self.url, &self.link])
    }

    /// `published_at`, else `date`, else `published`.
    pub fn timestamp(&self) -> Option<&str> {
        first_filled(&[&self.published_at, &self.date, &self.published])
    }

    /// `summary`, else `snippet`, else `description`.
    pub fn blurb(&self) -> Option<&str> {
        first_filled(&[&self.summary, &self.snippet, &self.description])
    }
}

/// A polled RSS/Atom endpoint and its optional display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl FeedSource {
    pub fn new(url: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            url: url.into(),
            label: label.map(str::to_string),
        }
    }
}

/// Per-category candidates, keyed by category id.
pub type CategoryItems = BTreeMap<&'static str, Vec<Item>>;

/// Data acquisition mode. One implementation is picked per report.
#[async_trait::async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    /// Returns recency-filtered, deduplicated, capped items per category.
    /// Failing sources contribute nothing; this never errors.
    async fn collect(&self, categories: &[CategoryConfig], cutoff: DateTime<Utc>) -> CategoryItems;
    fn name(&self) -> &'static str;
}
