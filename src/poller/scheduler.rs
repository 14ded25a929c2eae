use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::settings::PollConfig;
use crate::error::UpstreamError;
use crate::helpers::time::{days_until, now_i64, now_utc};
use crate::observability::metrics::ExporterMetrics;
use crate::sources::fetch::AccountSource;
use crate::sources::types::AccessTokenPage;
use crate::utils::constants::{ACCESS_TOKENS_PAGE_SIZE, QUERY_ACCESS_TOKENS, QUERY_QUOTA};

/// What one cycle managed to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub quota: Option<i64>,
    /// number of token series written, `None` when the fetch failed or is disabled
    pub tokens: Option<usize>,
    pub pruned: Vec<String>,
}

/// Periodic refresh of the exporter gauges from an [`AccountSource`].
///
/// Cycles run strictly one after another: fetch quota, fetch tokens, write,
/// sleep. An upstream failure only skips the writes of the affected gauge.
pub struct Poller<S> {
    source: S,
    metrics: Arc<ExporterMetrics>,
    interval: Duration,
    prune_stale_tokens: bool,
    clock: fn() -> DateTime<Utc>,
    cycle: u64,
}

impl<S: AccountSource> Poller<S> {
    pub fn new(source: S, metrics: Arc<ExporterMetrics>, poll_config: &PollConfig) -> Self {
        Self {
            source,
            metrics,
            interval: Duration::from_secs(poll_config.interval_seconds),
            prune_stale_tokens: poll_config.prune_stale_tokens,
            clock: now_utc,
            cycle: 0,
        }
    }

    /// Replace the wall clock used for the expiration countdown.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until `shutdown` is cancelled. A cycle already in flight
    /// finishes its writes before the loop exits.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("poll loop started, interval {}s", self.interval.as_secs());
        loop {
            if shutdown.is_cancelled() {
                break;
            }
            self.poll_once().await;

            debug!("sleeping {}s until next cycle", self.interval.as_secs());
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        info!("poll loop stopped after {} cycles", self.cycle);
    }

    pub async fn poll_once(&mut self) -> CycleOutcome {
        self.cycle += 1;
        let span = info_span!("poll_cycle", cycle = self.cycle);
        let outcome = self.cycle_inner().instrument(span).await;
        self.metrics.poll_cycles.inc();
        outcome
    }

    async fn cycle_inner(&self) -> CycleOutcome {
        info!("scraping metrics...");
        let mut outcome = CycleOutcome::default();

        match self.observe(QUERY_QUOTA, self.source.fetch_quota()).await {
            Ok(quota) => {
                self.metrics.set_available_tokens(quota);
                outcome.quota = Some(quota);
            }
            Err(e) => error!("quota fetch failed, keeping last value: {}", e),
        }

        if self.metrics.token_expiration_enabled() {
            match self.observe(QUERY_ACCESS_TOKENS, self.source.fetch_access_tokens()).await {
                Ok(page) => {
                    let (written, pruned) = self.write_tokens(page);
                    outcome.tokens = Some(written);
                    outcome.pruned = pruned;
                }
                Err(e) => error!("access token fetch failed, keeping last values: {}", e),
            }
        }

        info!(
            "cycle done: quota={:?}, tokens={:?}",
            outcome.quota, outcome.tokens
        );
        outcome
    }

    fn write_tokens(&self, page: AccessTokenPage) -> (usize, Vec<String>) {
        if page.has_next_page {
            warn!(
                "upstream reports more access tokens than the first page ({} of {:?}); only the first {} are exported",
                page.tokens.len(),
                page.total_count,
                ACCESS_TOKENS_PAGE_SIZE
            );
        }

        let now = (self.clock)();
        let mut seen = HashSet::with_capacity(page.tokens.len());
        for token in &page.tokens {
            let days = days_until(token.expire_time, now);
            debug!("token '{}' expires in {} days", token.name, days);
            self.metrics.set_token_days(&token.name, days);
            seen.insert(token.name.clone());
        }

        let pruned = if self.prune_stale_tokens {
            let removed = self.metrics.prune_tokens(&seen);
            if !removed.is_empty() {
                info!("removed series of vanished tokens: {:?}", removed);
            }
            removed
        } else {
            Vec::new()
        };

        (page.tokens.len(), pruned)
    }

    async fn observe<T, F>(&self, query: &str, request: F) -> Result<T, UpstreamError>
    where
        F: Future<Output = Result<T, UpstreamError>>,
    {
        let metrics = &self.metrics;
        metrics.upstream_requests.with_label_values(&[query]).inc();
        let start = Instant::now();
        let result = request.await;
        metrics
            .upstream_duration
            .with_label_values(&[query])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => metrics.last_success_unix.with_label_values(&[query]).set(now_i64()),
            Err(e) => metrics
                .upstream_failures
                .with_label_values(&[query, e.reason()])
                .inc(),
        }
        result
    }
}
