// src/ingest/providers/feeds.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use tokio::task::JoinSet;

use crate::categories::{matches_category, CategoryConfig};
use crate::ingest::dedup::dedup_and_cap;
use crate::ingest::markup::parse_feed;
use crate::ingest::normalize::item_from_entry;
use crate::ingest::recency::retain_recent;
use crate::ingest::types::{AcquisitionStrategy, CategoryItems, FeedSource, Item};

/// Built-in feed list used when no sources config is present.
pub fn default_feeds() -> Vec<FeedSource> {
    vec![
        FeedSource::new("https://nsm.no/aktuelt/rss", Some("NSM")),
        FeedSource::new(
            "https://www.cisa.gov/cybersecurity-advisories/all.xml",
            Some("CISA"),
        ),
        FeedSource::new("https://www.nrk.no/toppsaker.rss", None),
        FeedSource::new("https://www.digi.no/rss", None),
        FeedSource::new("https://www.forsvaretsforum.no/rss", None),
        FeedSource::new(
            "https://news.google.com/rss/search?q=Cyberforsvaret&hl=no&gl=NO&ceid=NO:no",
            Some("Google News"),
        ),
    ]
}

/// Polls a fixed feed list once per report, pools everything, then classifies.
pub struct FeedStrategy {
    client: reqwest::Client,
    feeds: Vec<FeedSource>,
}

impl FeedStrategy {
    pub fn new(client: reqwest::Client, feeds: Vec<FeedSource>) -> Self {
        Self { client, feeds }
    }

    /// Fetch all feeds concurrently; failed feeds contribute nothing.
    /// Items come back in feed-list order regardless of completion order.
    pub async fn pool(&self) -> Vec<Item> {
        let mut set = JoinSet::new();
        for (idx, feed) in self.feeds.iter().cloned().enumerate() {
            let client = self.client.clone();
            set.spawn(async move {
                let res = fetch_feed(&client, &feed).await;
                (idx, feed, res)
            });
        }

        let mut per_feed: Vec<(usize, Vec<Item>)> = Vec::with_capacity(self.feeds.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, _, Ok(items))) => per_feed.push((idx, items)),
                Ok((_, feed, Err(e))) => {
                    tracing::warn!(error = ?e, feed = %feed.url, "feed skipped");
                    counter!("monitor_source_errors_total").increment(1);
                }
                Err(e) => {
                    tracing::warn!(error = ?e, "feed task aborted");
                    counter!("monitor_source_errors_total").increment(1);
                }
            }
        }

        per_feed.sort_by_key(|(idx, _)| *idx);
        per_feed.into_iter().flat_map(|(_, items)| items).collect()
    }
}

/// GET one feed and scrape it. Non-2xx is an error.
pub async fn fetch_feed(client: &reqwest::Client, feed: &FeedSource) -> Result<Vec<Item>> {
    let t0 = std::time::Instant::now();
    let resp = client
        .get(&feed.url)
        .send()
        .await
        .with_context(|| format!("feed http get() {}", feed.url))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("feed {} answered {}", feed.url, status);
    }
    let body = resp.text().await.context("feed http .text()")?;

    let items: Vec<Item> = parse_feed(&body)
        .into_iter()
        .filter_map(|e| item_from_entry(e, feed.label.as_deref()))
        .collect();

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("monitor_fetch_ms").record(ms);
    counter!("monitor_items_fetched_total").increment(items.len() as u64);
    tracing::debug!(feed = %feed.url, items = items.len(), ms, "feed parsed");
    Ok(items)
}

#[async_trait]
impl AcquisitionStrategy for FeedStrategy {
    async fn collect(&self, categories: &[CategoryConfig], cutoff: DateTime<Utc>) -> CategoryItems {
        let mut pooled = self.pool().await;
        let stale = retain_recent(&mut pooled, cutoff);
        counter!("monitor_items_stale_total").increment(stale as u64);

        categories
            .iter()
            .map(|c| {
                let matched = pooled
                    .iter()
                    .filter(|it| matches_category(it, c.id))
                    .cloned();
                (c.id, dedup_and_cap(matched))
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "feeds"
    }
}
