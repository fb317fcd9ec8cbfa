use std::sync::Arc;

use serde::Deserialize;
use shuttle_axum::axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::categories::{CategoryConfig, CATEGORIES};
use crate::ingest::types::AcquisitionStrategy;
use crate::report::{generate_report, parse_window_hours, Report};

/// Request-independent pieces only; every report is built from scratch.
#[derive(Clone)]
pub struct AppState {
    pub strategy: Arc<dyn AcquisitionStrategy>,
    pub categories: &'static [CategoryConfig],
}

impl AppState {
    pub fn new(strategy: Arc<dyn AcquisitionStrategy>) -> Self {
        Self {
            strategy,
            categories: CATEGORIES,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/report", get(report))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct ReportQuery {
    // Kept raw so junk input falls back to the default window instead of a 400.
    #[serde(default)]
    hours: Option<String>,
}

async fn report(State(state): State<AppState>, Query(q): Query<ReportQuery>) -> Json<Report> {
    let hours = parse_window_hours(q.hours.as_deref());
    Json(generate_report(state.strategy.as_ref(), state.categories, hours).await)
}
