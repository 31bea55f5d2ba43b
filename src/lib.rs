pub mod classifier;
pub mod config;
pub mod github;
pub mod metrics;
pub mod printer;
pub mod refresher;

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Json, Router};
use config::AppConfig;
use metrics::MetricsSink;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Shared application state accessible to all request handlers.
pub struct AppState {
    /// Gauge sink written by the refresher, read by the `/metrics` handler.
    pub sink: Arc<MetricsSink>,
    /// Application configuration loaded from environment variables.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            sink: Arc::new(MetricsSink::new()),
            config,
        }
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .route("/healthz", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Prometheus text exposition of the pull request gauges.
///
/// Always reflects the most recently completed publish, or the
/// zero-initialized set before the first successful refresh.
async fn serve_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.sink.render(),
    )
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "wip-exporter",
        version: env!("CARGO_PKG_VERSION"),
    })
}
