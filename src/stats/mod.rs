//! Aggregate request statistics
//!
//! Locally derived counters (successful/failed/retried/total) merged with the
//! periodically polled status of the external interceptor. The poll never
//! overwrites the local counters; only [`StatsAggregator::reset`] does.
//!
//! Prometheus export follows the same split: counters are recorded at the
//! mutation sites, gauges are refreshed from the polled status.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::interceptor::{InterceptorStatus, RetryInterceptor};
use crate::store::DashboardStore;

/// Kind of terminal outcome recorded into the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Successful,
    Failed,
}

/// Point-in-time view of the aggregate statistics.
///
/// Derived, not authoritative: `total == successful + failed` holds after any
/// sequence of recordings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub successful: u64,
    pub failed: u64,
    pub retried: u64,
    pub total: u64,
    pub is_active: bool,
    pub is_online: bool,
    pub pending_requests: u32,
}

/// Counter state plus the last polled interceptor status.
#[derive(Debug)]
pub struct StatsAggregator {
    successful: u64,
    failed: u64,
    retried: u64,
    total: u64,
    is_active: bool,
    is_online: bool,
    pending_requests: u32,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            successful: 0,
            failed: 0,
            retried: 0,
            total: 0,
            is_active: false,
            is_online: true,
            pending_requests: 0,
        }
    }

    /// Increment the named counter and `total`.
    pub fn record_outcome(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Successful => self.successful += 1,
            OutcomeKind::Failed => self.failed += 1,
        }
        self.total += 1;
    }

    /// Increment the retry counter. Retries are attempts, not outcomes, so
    /// `total` is untouched.
    pub fn record_retry(&mut self) {
        self.retried += 1;
    }

    /// Merge the polled interceptor status. Local counters are never touched
    /// here.
    pub fn apply_status(&mut self, status: &InterceptorStatus) {
        self.is_active = status.is_active;
        self.is_online = status.is_online;
        self.pending_requests = status.pending_requests;

        metrics::gauge!("retryscope_pending_requests").set(status.pending_requests as f64);
        metrics::gauge!("retryscope_interceptor_active")
            .set(if status.is_active { 1.0 } else { 0.0 });
        metrics::gauge!("retryscope_network_online").set(if status.is_online { 1.0 } else { 0.0 });
    }

    /// Record the simulated network flag outside a full status poll.
    pub fn set_online(&mut self, online: bool) {
        self.is_online = online;
        metrics::gauge!("retryscope_network_online").set(if online { 1.0 } else { 0.0 });
    }

    /// Zero all locally derived counters. Polled fields are left as last seen.
    pub fn reset(&mut self) {
        self.successful = 0;
        self.failed = 0;
        self.retried = 0;
        self.total = 0;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            successful: self.successful,
            failed: self.failed,
            retried: self.retried,
            total: self.total,
            is_active: self.is_active,
            is_online: self.is_online,
            pending_requests: self.pending_requests,
        }
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize the Prometheus exporter with request-duration buckets.
///
/// Buckets cover the millisecond-to-seconds range of demo requests.
/// Returns a handle used to render `/metrics`.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

    let duration_buckets = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("retryscope_request_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Spawn the fixed-period status poll.
///
/// Each tick queries the external interceptor and merges the result into the
/// store's snapshot. Runs until the token is cancelled.
pub fn spawn_poll_loop(
    store: Arc<DashboardStore>,
    interceptor: Arc<dyn RetryInterceptor>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::debug!(period_ms = period.as_millis() as u64, "Stats poll started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Stats poll shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let status = interceptor.status().await;
                    store.apply_interceptor_status(&status);
                }
            }
        }
    })
}
