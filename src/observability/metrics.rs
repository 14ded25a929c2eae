use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use prometheus::{
    Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    IntGaugeVec, Opts, Registry, TextEncoder,
};
use tracing::info;

pub const METRICS_NAMESPACE: &str = "pixai";
pub const TOKEN_LABEL: &str = "token";

/// Owned metric state shared by the poll loop (writer) and the scrape
/// handler (reader).
///
/// Each gauge value is an atomic `f64`; labeled children live behind the
/// prometheus crate's own lock, held only for one lookup, so a scrape never
/// sees a half-written value.
pub struct ExporterMetrics {
    pub registry: Registry,

    // Exported account facts
    pub available_tokens: Gauge,
    /// absent when per-token expiration metrics are disabled
    pub token_days_until_expiration: Option<GaugeVec>,

    // Exporter self-observability
    pub up: IntGauge,
    pub poll_cycles: IntCounter,
    pub upstream_requests: IntCounterVec,
    pub upstream_failures: IntCounterVec,
    pub upstream_duration: HistogramVec,
    pub last_success_unix: IntGaugeVec,

    known_tokens: Mutex<HashSet<String>>,
}

impl ExporterMetrics {
    pub fn new(token_expiration_enabled: bool) -> prometheus::Result<Arc<Self>> {
        info!("Initializing Metrics ...");
        let registry = Registry::new_custom(Some(METRICS_NAMESPACE.into()), None)?;

        let token_days_until_expiration = if token_expiration_enabled {
            Some(GaugeVec::new(Opts::new("token_days_until_expiration", "Number of days until token expires"), &[TOKEN_LABEL])?)
        } else {
            None
        };

        let metrics = Arc::new(Self {
            available_tokens: Gauge::new("available_tokens_total", "Total amount of tokens available")?,
            token_days_until_expiration,

            up: IntGauge::new("exporter_up", "1 if the exporter is serving scrapes")?,
            poll_cycles: IntCounter::new("exporter_poll_cycles_total", "Completed poll cycles")?,
            upstream_requests: IntCounterVec::new(Opts::new("exporter_upstream_requests_total", "Upstream GraphQL requests by query"), &["query"])?,
            upstream_failures: IntCounterVec::new(Opts::new("exporter_upstream_failures_total", "Upstream GraphQL failures by query and reason"), &["query", "reason"])?,
            upstream_duration: HistogramVec::new(HistogramOpts::new("exporter_upstream_request_duration_seconds", "Upstream GraphQL request duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 25.0]), &["query"])?,
            last_success_unix: IntGaugeVec::new(Opts::new("exporter_last_success_timestamp_seconds", "Unix time of the last successful upstream request"), &["query"])?,

            known_tokens: Mutex::new(HashSet::new()),
            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.available_tokens.clone()))?;
        if let Some(token_days) = &metrics.token_days_until_expiration {
            reg.register(Box::new(token_days.clone()))?;
        }
        reg.register(Box::new(metrics.up.clone()))?;
        reg.register(Box::new(metrics.poll_cycles.clone()))?;
        reg.register(Box::new(metrics.upstream_requests.clone()))?;
        reg.register(Box::new(metrics.upstream_failures.clone()))?;
        reg.register(Box::new(metrics.upstream_duration.clone()))?;
        reg.register(Box::new(metrics.last_success_unix.clone()))?;

        Ok(metrics)
    }

    pub fn token_expiration_enabled(&self) -> bool {
        self.token_days_until_expiration.is_some()
    }

    pub fn set_available_tokens(&self, quota: i64) {
        self.available_tokens.set(quota as f64);
    }

    /// Create or overwrite the series of one token; same name, same series.
    pub fn set_token_days(&self, token: &str, days: i64) {
        if let Some(token_days) = &self.token_days_until_expiration {
            token_days.with_label_values(&[token]).set(days as f64);
            if let Ok(mut known) = self.known_tokens.lock() {
                known.insert(token.to_owned());
            }
        }
    }

    /// Remove series of tokens not in `current`; returns the removed names.
    pub fn prune_tokens(&self, current: &HashSet<String>) -> Vec<String> {
        let Some(token_days) = &self.token_days_until_expiration else {
            return Vec::new();
        };
        let Ok(mut known) = self.known_tokens.lock() else {
            return Vec::new();
        };
        let stale: Vec<String> = known.difference(current).cloned().collect();
        for name in &stale {
            let _ = token_days.remove_label_values(&[name.as_str()]);
            known.remove(name);
        }
        stale
    }

    /// Render the registry in the text exposition format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
