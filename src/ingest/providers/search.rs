// src/ingest/providers/search.rs
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::categories::CategoryConfig;
use crate::ingest::dedup::CategoryBucket;
use crate::ingest::normalize::item_from_hit;
use crate::ingest::recency::is_recent;
use crate::ingest::types::{AcquisitionStrategy, CategoryItems, SearchHit};

pub const DEFAULT_RESULT_CAP: usize = 5;
pub const DEFAULT_PACING: Duration = Duration::from_millis(150);

/// The API answers either with a bare array or with `{"results": [...]}`.
/// Hits are kept as raw values so one malformed hit cannot sink the rest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Hits(Vec<serde_json::Value>),
    Wrapped {
        #[serde(default)]
        results: Vec<serde_json::Value>,
    },
}

impl SearchResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        let raw = match self {
            SearchResponse::Hits(v) => v,
            SearchResponse::Wrapped { results } => results,
        };
        raw.into_iter()
            .filter_map(|v| match serde_json::from_value::<SearchHit>(v) {
                Ok(hit) => Some(hit),
                Err(e) => {
                    tracing::debug!(error = %e, "search hit skipped");
                    None
                }
            })
            .collect()
    }
}

/// Per-category keyword queries against a paid search API, issued one at a
/// time with a fixed pause in between.
pub struct SearchApiStrategy {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    result_cap: usize,
    pacing: Duration,
}

impl SearchApiStrategy {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            result_cap: DEFAULT_RESULT_CAP,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_result_cap(mut self, cap: usize) -> Self {
        self.result_cap = cap.max(1);
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// One request: `GET endpoint?q=..&num=..`. Non-2xx is an error.
    pub async fn query(&self, q: &str) -> Result<Vec<SearchHit>> {
        let t0 = std::time::Instant::now();
        let num = self.result_cap.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .query(&[("q", q), ("num", num.as_str())])
            .send()
            .await
            .context("search http get()")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("search api answered {status}");
        }
        let payload: SearchResponse = resp.json().await.context("decoding search hits")?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("monitor_fetch_ms").record(ms);
        let mut hits = payload.into_hits();
        hits.truncate(self.result_cap);
        counter!("monitor_items_fetched_total").increment(hits.len() as u64);
        Ok(hits)
    }
}

#[async_trait]
impl AcquisitionStrategy for SearchApiStrategy {
    async fn collect(&self, categories: &[CategoryConfig], cutoff: DateTime<Utc>) -> CategoryItems {
        let mut out = CategoryItems::new();
        let mut first_request = true;

        for c in categories {
            let mut bucket = CategoryBucket::new();
            for q in c.queries {
                if bucket.is_full() {
                    break;
                }
                if !first_request && !self.pacing.is_zero() {
                    tokio::time::sleep(self.pacing).await;
                }
                first_request = false;

                let hits = match self.query(q).await {
                    Ok(h) => h,
                    Err(e) => {
                        tracing::warn!(
                            error = ?e,
                            category = c.id,
                            query = q,
                            "search query skipped"
                        );
                        counter!("monitor_source_errors_total").increment(1);
                        continue;
                    }
                };
                tracing::debug!(
                    category = c.id,
                    query = q,
                    hits = hits.len(),
                    "search query done"
                );

                for item in hits.iter().filter_map(item_from_hit) {
                    if !is_recent(&item, cutoff) {
                        counter!("monitor_items_stale_total").increment(1);
                        continue;
                    }
                    bucket.push(item);
                }
            }
            out.insert(c.id, bucket.into_items());
        }
        out
    }

    fn name(&self) -> &'static str {
        "search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_accepts_array_and_wrapped() {
        let arr: SearchResponse =
            serde_json::from_str(r#"[{"title":"a","url":"https://a.test"}]"#).unwrap();
        assert_eq!(arr.into_hits().len(), 1);

        let wrapped: SearchResponse = serde_json::from_str(
            r#"{"results":[{"title":"a","link":"https://a.test","date":"2024-01-01"},{"url":"https://b.test"}]}"#,
        )
        .unwrap();
        let hits = wrapped.into_hits();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].target(), Some("https://a.test"));
        assert_eq!(hits[0].timestamp(), Some("2024-01-01"));
    }

    #[test]
    fn duplicate_field_spellings_do_not_drop_the_response() {
        let payload: SearchResponse = serde_json::from_str(
            r#"[{"title":"a","url":"https://a.test","link":"https://a.test/other",
                 "published_at":"2024-01-01","date":"2023-12-31",
                 "summary":"s","snippet":"t"}]"#,
        )
        .unwrap();
        let hits = payload.into_hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target(), Some("https://a.test"));
        assert_eq!(hits[0].timestamp(), Some("2024-01-01"));
        assert_eq!(hits[0].blurb(), Some("s"));
    }

    #[test]
    fn malformed_hit_is_skipped_alone() {
        let payload: SearchResponse = serde_json::from_str(
            r#"{"results":[{"title":42,"url":"https://bad.test"},"junk",{"url":"https://ok.test"}]}"#,
        )
        .unwrap();
        let hits = payload.into_hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target(), Some("https://ok.test"));
    }
}
