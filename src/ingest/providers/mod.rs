// src/ingest/providers/mod.rs
pub mod feeds;
pub mod search;

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::SourcesConfig;
use crate::ingest::types::AcquisitionStrategy;

use self::feeds::FeedStrategy;
use self::search::SearchApiStrategy;

/// Shared HTTP client for every upstream. Timeouts keep one hung source from
/// stalling a report.
pub fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("cyber-monitor/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(10))
        .build()
        .context("building reqwest client")
}

/// Search API when a credential is configured, feeds otherwise.
pub fn select_strategy(
    cfg: &SourcesConfig,
    client: reqwest::Client,
) -> Box<dyn AcquisitionStrategy> {
    if cfg.search.is_usable() {
        tracing::info!(endpoint = %cfg.search.endpoint, "using search-api strategy");
        Box::new(
            SearchApiStrategy::new(client, &cfg.search.endpoint, &cfg.search.api_key)
                .with_result_cap(cfg.search.result_cap)
                .with_pacing(Duration::from_millis(cfg.search.pacing_ms)),
        )
    } else {
        tracing::info!(feeds = cfg.feeds.len(), "using feed strategy");
        Box::new(FeedStrategy::new(client, cfg.feeds.clone()))
    }
}
