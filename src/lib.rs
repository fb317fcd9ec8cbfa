// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod categories;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod report;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::categories::{CategoryConfig, CATEGORIES};
pub use crate::ingest::types::{AcquisitionStrategy, FeedSource, Item};
pub use crate::report::{generate_report, parse_window_hours, Report};

use std::sync::Arc;

/// Build the full application router from on-disk/env configuration.
///
/// Used by the Shuttle entrypoint; tests build [`api::router`] directly with
/// their own strategy.
pub fn app() -> anyhow::Result<shuttle_axum::axum::Router> {
    let cfg = crate::config::SourcesConfig::load_default()?;
    let client = crate::ingest::providers::build_http_client()?;
    let strategy = crate::ingest::providers::select_strategy(&cfg, client);
    let metrics = crate::metrics::Metrics::init(cfg.feeds.len())?;

    let state = crate::api::AppState::new(Arc::from(strategy));
    Ok(crate::api::router(state).merge(metrics.router()))
}
