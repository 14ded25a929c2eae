use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::observability::metrics::ExporterMetrics;
use crate::observability::routes::MetricsState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
}

impl AppState {
    pub fn new(metrics: Arc<ExporterMetrics>) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics),
        }
    }
}

pub fn router(settings_config: &SettingsConfig, metrics: Arc<ExporterMetrics>) -> Router {
    let state = AppState::new(metrics);
    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Bind the scrape listener on the configured host and port.
pub async fn bind(settings_config: &SettingsConfig) -> Result<TcpListener> {
    let bind_addr = &settings_config.server.host;
    let port = settings_config.server.port;
    TcpListener::bind((bind_addr.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {}:{}", bind_addr, port))
}

/// Serve scrapes on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    settings_config: &SettingsConfig,
    metrics: Arc<ExporterMetrics>,
    shutdown: CancellationToken,
) -> Result<()> {
    let app = router(settings_config, metrics.clone());
    info!(
        "serving metrics on http://{}{}",
        listener.local_addr()?,
        settings_config.metrics.path
    );
    metrics.up.set(1);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("metrics server failed")?;

    metrics.up.set(0);
    info!("metrics server stopped");
    Ok(())
}

/// Bind and serve in one step.
pub async fn start(
    settings_config: &SettingsConfig,
    metrics: Arc<ExporterMetrics>,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = bind(settings_config).await?;
    serve(listener, settings_config, metrics, shutdown).await
}
