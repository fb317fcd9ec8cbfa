// src/report.rs
//! Report assembly: window parsing, strategy run, envelope.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::categories::CategoryConfig;
use crate::ingest::dedup::dedup_and_cap;
use crate::ingest::recency::cutoff;
use crate::ingest::types::{AcquisitionStrategy, Item};

pub const DEFAULT_WINDOW_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryOutput {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportMeta {
    pub titles: BTreeMap<String, String>,
    /// Which acquisition path produced the items ("feeds" | "search").
    pub strategy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub generated_at: String,
    #[serde(serialize_with = "serialize_hours")]
    pub window_hours: f64,
    pub categories: BTreeMap<String, CategoryOutput>,
    pub meta: ReportMeta,
}

/// Whole windows go out as JSON integers (`24`, not `24.0`).
fn serialize_hours<S: serde::Serializer>(hours: &f64, s: S) -> Result<S::Ok, S::Error> {
    if hours.fract() == 0.0 && *hours >= 0.0 && *hours <= u64::MAX as f64 {
        s.serialize_u64(*hours as u64)
    } else {
        s.serialize_f64(*hours)
    }
}

/// Caller-supplied window. Absent, blank, non-numeric, non-finite and
/// non-positive values all mean 24; anything else is used as given.
pub fn parse_window_hours(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|h| h.is_finite() && *h > 0.0)
        .unwrap_or(DEFAULT_WINDOW_HOURS)
}

/// Run one strategy over the category table and build the envelope.
pub async fn generate_report(
    strategy: &dyn AcquisitionStrategy,
    categories: &[CategoryConfig],
    window_hours: f64,
) -> Report {
    generate_report_at(strategy, categories, window_hours, Utc::now()).await
}

/// Same as [`generate_report`] with an explicit "now".
pub async fn generate_report_at(
    strategy: &dyn AcquisitionStrategy,
    categories: &[CategoryConfig],
    window_hours: f64,
    now: DateTime<Utc>,
) -> Report {
    crate::ingest::ensure_metrics_described();

    let mut collected = strategy.collect(categories, cutoff(now, window_hours)).await;

    // Every configured id gets an entry, matched or not.
    let out: BTreeMap<String, CategoryOutput> = categories
        .iter()
        .map(|c| {
            let items = collected.remove(c.id).unwrap_or_default();
            (
                c.id.to_string(),
                CategoryOutput {
                    items: dedup_and_cap(items),
                },
            )
        })
        .collect();

    let titles = categories
        .iter()
        .map(|c| (c.id.to_string(), c.title.to_string()))
        .collect();

    counter!("monitor_reports_total").increment(1);
    tracing::info!(
        target: "report",
        strategy = strategy.name(),
        window_hours,
        total = out.values().map(|c| c.items.len()).sum::<usize>(),
        "report generated"
    );

    Report {
        generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        window_hours,
        categories: out,
        meta: ReportMeta {
            titles,
            strategy: strategy.name().to_string(),
        },
    }
}
