use std::sync::Arc;

use axum::routing::get;
use axum::{extract::State, response::IntoResponse, Router};
use http::{header::CONTENT_TYPE, StatusCode};
use tracing::error;

use crate::config::settings::MetricsConfig;
use crate::observability::metrics::ExporterMetrics;
use crate::server::server::AppState;
use crate::utils::constants::HEALTH_PATH;

#[derive(Clone)]
pub struct MetricsState {
    pub metrics: Arc<ExporterMetrics>,
}

impl MetricsState {
    pub fn new(metrics: Arc<ExporterMetrics>) -> Self {
        Self { metrics }
    }

    pub fn router(&self, metrics_config: &MetricsConfig) -> Router<AppState> {
        Router::new()
            .route(metrics_config.path.as_str(), get(get_metrics))
            .route(HEALTH_PATH, get(get_health))
    }
}

async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics_state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            error!("failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, "text/plain")],
                "failed to encode metrics".to_string(),
            )
        }
    }
}

async fn get_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
