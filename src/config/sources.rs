// src/config/sources.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::providers::feeds::default_feeds;
use crate::ingest::providers::search::{DEFAULT_PACING, DEFAULT_RESULT_CAP};
use crate::ingest::types::FeedSource;

pub const ENV_SOURCES_PATH: &str = "MONITOR_SOURCES_PATH";
pub const ENV_SEARCH_API_KEY: &str = "SEARCH_API_KEY";
pub const ENV_SEARCH_ENDPOINT: &str = "SEARCH_API_ENDPOINT";

fn default_result_cap() -> usize {
    DEFAULT_RESULT_CAP
}
fn default_pacing_ms() -> u64 {
    DEFAULT_PACING.as_millis() as u64
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    #[serde(default)]
    pub endpoint: String,
    /// Literal key, or "ENV" / empty meaning: read `SEARCH_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            result_cap: default_result_cap(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

impl SearchConfig {
    /// Search mode is only usable with both an endpoint and a key.
    pub fn is_usable(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourcesConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedSource>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            feeds: default_feeds(),
        }
    }
}

impl SourcesConfig {
    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sources config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: SourcesConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content).context("parsing sources json")?,
            _ => toml::from_str(&content).context("parsing sources toml")?,
        };
        Ok(cfg.resolved())
    }

    /// Env var + fallbacks:
    /// 1) $MONITOR_SOURCES_PATH
    /// 2) config/sources.toml
    /// 3) config/sources.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
        }
        for candidate in ["config/sources.toml", "config/sources.json"] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default().resolved())
    }

    /// Fill secrets from env and clean the feed list.
    fn resolved(mut self) -> Self {
        let key = self.search.api_key.trim();
        if key.is_empty() || key.eq_ignore_ascii_case("env") {
            self.search.api_key = std::env::var(ENV_SEARCH_API_KEY).unwrap_or_default();
        }
        if self.search.endpoint.trim().is_empty() {
            self.search.endpoint = std::env::var(ENV_SEARCH_ENDPOINT).unwrap_or_default();
        }
        self.search.result_cap = self.search.result_cap.max(1);
        self.feeds = clean_feeds(self.feeds);
        self
    }
}

fn clean_feeds(feeds: Vec<FeedSource>) -> Vec<FeedSource> {
    let mut seen = HashSet::new();
    feeds
        .into_iter()
        .filter_map(|f| {
            let url = f.url.trim().to_string();
            if url.is_empty() || !seen.insert(url.clone()) {
                return None;
            }
            let label = f.label.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
            Some(FeedSource { url, label })
        })
        .collect()
}
