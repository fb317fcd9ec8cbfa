// src/ingest/mod.rs
pub mod dedup;
pub mod markup;
pub mod normalize;
pub mod providers;
pub mod recency;
pub mod types;

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

pub use types::{AcquisitionStrategy, FeedSource, Item};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "monitor_items_fetched_total",
            "Items parsed from feeds or returned by the search API."
        );
        describe_counter!(
            "monitor_items_stale_total",
            "Items dropped for falling outside the time window."
        );
        describe_counter!(
            "monitor_source_errors_total",
            "Feed fetches or search queries that failed and were skipped."
        );
        describe_counter!("monitor_reports_total", "Reports generated.");
        describe_histogram!("monitor_fetch_ms", "Per-source fetch+parse time in milliseconds.");
    });
}
