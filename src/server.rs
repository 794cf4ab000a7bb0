//! Web server module for synthmon.
//!
//! Serves the metrics scrape endpoint and a liveness probe.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::metrics::{self, MetricsStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: MetricsStore,
    /// Number of configured targets.
    pub target_count: usize,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    targets: usize,
}

/// Create the Axum router, serving metrics at `metrics_path`.
pub fn create_router(state: AppState, metrics_path: &str) -> Router {
    let app_state = Arc::new(state);

    Router::new()
        .route(metrics_path, get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(app_state)
}

/// Scrape endpoint.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot();
    (
        [(header::CONTENT_TYPE, metrics::CONTENT_TYPE)],
        metrics::render(&snapshot),
    )
}

/// Liveness probe.
async fn healthz_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        targets: state.target_count,
    })
}
