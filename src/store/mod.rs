//! Process-wide observable dashboard store
//!
//! Composes the request tracker, activity log, history ledger, and stats
//! aggregator behind a single mutex so every lifecycle transition (status
//! change, log append, counter bump) is one atomic step relative to
//! concurrently delivered completions. Subscribers are notified over a
//! broadcast channel after each mutation, outside the lock.

use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::activity::{ActivityLog, LogEntry, Severity};
use crate::config::TrackingConfig;
use crate::history::HistoryLedger;
use crate::interceptor::{
    classify_message, extract_url, FailureKind, InterceptorEvent, InterceptorStatus,
};
use crate::stats::{OutcomeKind, StatsAggregator, StatsSnapshot};
use crate::tracker::{Completion, Outcome, RequestRecord, RequestTracker, TrackerError, Transport};

/// Capacity of the update broadcast channel. Slow subscribers lag rather than
/// block mutations.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Kind of store mutation pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UpdateType {
    /// An activity log entry was appended (or the log was cleared)
    Log,
    /// A request was started or reached a terminal state
    Request,
    /// The stats snapshot changed
    Stats,
    /// The simulated network flag flipped
    Network,
}

/// Update message sent to store subscribers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoreUpdate {
    pub update_type: UpdateType,
    /// JSON payload for the update
    pub data: serde_json::Value,
}

struct StoreInner {
    tracker: RequestTracker,
    activity: ActivityLog,
    history: HistoryLedger,
    stats: StatsAggregator,
}

/// The single owned state store behind the console.
pub struct DashboardStore {
    inner: Mutex<StoreInner>,
    updates: broadcast::Sender<StoreUpdate>,
}

impl DashboardStore {
    pub fn new(config: &TrackingConfig) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(StoreInner {
                tracker: RequestTracker::new(),
                activity: ActivityLog::new(config.log_capacity),
                history: HistoryLedger::new(config.history_capacity),
                stats: StatsAggregator::new(),
            }),
            updates,
        }
    }

    /// Subscribe to mutation notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.updates.subscribe()
    }

    /// Begin tracking a request: fresh id, pending record in the history
    /// ledger, start log entry.
    pub fn begin_request(&self, transport: Transport, url: &str, description: &str) -> String {
        let (record, entry, active) = {
            let mut inner = self.inner.lock().unwrap();
            let record = inner.tracker.begin(transport, url, description);
            inner.history.record(record.clone());
            let entry = inner.activity.append(
                Severity::Info,
                format!("Starting {} request: {}", transport.label(), description),
                Some(record.id.clone()),
            );
            (record, entry, inner.tracker.active_count())
        };

        metrics::gauge!("retryscope_active_requests").set(active as f64);
        tracing::info!(
            request_id = %record.id,
            transport = %transport,
            url = %url,
            "Request started"
        );

        self.publish_request(&record);
        self.publish_log(&entry);
        record.id
    }

    /// Transition a pending request into a terminal state, exactly once, with
    /// its log and stat side effects.
    ///
    /// Double completion and unknown ids are consistency defects: reported,
    /// state unchanged.
    pub fn complete_request(&self, id: &str, outcome: Outcome) -> Result<Completion, TrackerError> {
        let (completion, entry, record, snapshot, active) = {
            let mut inner = self.inner.lock().unwrap();
            let completion = match inner.tracker.complete(id, &outcome) {
                Ok(completion) => completion,
                Err(err) => {
                    tracing::warn!(request_id = %id, "Completion for non-pending request ignored");
                    return Err(err);
                }
            };
            let entry = apply_completion(&mut inner, &completion);
            let record = inner
                .history
                .entries()
                .into_iter()
                .find(|record| record.id == id);
            (
                completion,
                entry,
                record,
                inner.stats.snapshot(),
                inner.tracker.active_count(),
            )
        };

        publish_completion_metrics(&completion, active);

        if let Some(record) = record {
            self.publish_request(&record);
        }
        self.publish_log(&entry);
        self.publish_stats(&snapshot);
        Ok(completion)
    }

    /// A lenient or callback transport observed a non-success status. The
    /// request stays pending for the interceptor's retry domain; only a
    /// warning is logged.
    pub fn note_retryable_status(&self, id: &str, status_code: u16) {
        let entry = {
            let mut inner = self.inner.lock().unwrap();
            let inner = &mut *inner;
            let Some(in_flight) = inner.tracker.pending(id) else {
                tracing::warn!(request_id = %id, "Retryable status for non-pending request ignored");
                return;
            };
            let message = format!(
                "{} server error ({}) - will be retried: {}",
                in_flight.transport.label(),
                status_code,
                in_flight.description
            );
            inner
                .activity
                .append(Severity::Warning, message, Some(id.to_string()))
        };
        self.publish_log(&entry);
    }

    /// Terminal `MaxRetries` for every pending request on `url`, as reported
    /// by the interceptor's exhaustion event. Returns the resolved ids.
    pub fn complete_exhausted(&self, url: &str) -> Vec<String> {
        let (resolved, updates, snapshot, active) = {
            let mut inner = self.inner.lock().unwrap();
            let ids = inner.tracker.pending_ids_for_url(url);
            let mut resolved = Vec::with_capacity(ids.len());
            let mut updates = Vec::new();

            for id in ids {
                if let Ok(completion) = inner.tracker.complete(&id, &Outcome::RetriesExhausted) {
                    let entry = apply_completion(&mut inner, &completion);
                    let record = inner
                        .history
                        .entries()
                        .into_iter()
                        .find(|record| record.id == id);
                    updates.push((completion, entry, record));
                    resolved.push(id);
                }
            }
            (
                resolved,
                updates,
                inner.stats.snapshot(),
                inner.tracker.active_count(),
            )
        };

        for (completion, entry, record) in &updates {
            publish_completion_metrics(completion, active);
            if let Some(record) = record {
                self.publish_request(record);
            }
            self.publish_log(entry);
        }
        if !updates.is_empty() {
            self.publish_stats(&snapshot);
        }
        resolved
    }

    /// Record a retry notification from the interceptor.
    pub fn record_retry_event(&self, url: &str, attempt: u32, max_retries: u32) {
        let (entry, snapshot) = {
            let mut inner = self.inner.lock().unwrap();
            inner.stats.record_retry();
            let entry = inner.activity.append(
                Severity::Warning,
                format!("Retrying {} (attempt {}/{})", url, attempt, max_retries),
                None,
            );
            (entry, inner.stats.snapshot())
        };

        metrics::counter!("retryscope_retries_total").increment(1);
        self.publish_log(&entry);
        self.publish_stats(&snapshot);
    }

    /// Last-resort channel for asynchronous errors that reach the console as
    /// plain strings. Applies the expected/unexpected classification.
    pub fn report_async_error(&self, message: &str) {
        match classify_message(message) {
            FailureKind::RetriesExhausted => {
                let url = extract_url(message).unwrap_or("unknown URL").to_string();
                let resolved = self.complete_exhausted(&url);
                if resolved.is_empty() {
                    // No tracked request to resolve; still a failed outcome
                    let (entry, snapshot) = {
                        let mut inner = self.inner.lock().unwrap();
                        inner.stats.record_outcome(OutcomeKind::Failed);
                        let entry = inner.activity.append(
                            Severity::Warning,
                            format!("Expected failure: request to {} failed after all retries", url),
                            None,
                        );
                        (entry, inner.stats.snapshot())
                    };
                    self.publish_log(&entry);
                    self.publish_stats(&snapshot);
                }
            }
            FailureKind::Other => {
                let (entry, snapshot) = {
                    let mut inner = self.inner.lock().unwrap();
                    inner.stats.record_outcome(OutcomeKind::Failed);
                    let entry = inner.activity.append(
                        Severity::Error,
                        format!("Unexpected error: {}", message),
                        None,
                    );
                    (entry, inner.stats.snapshot())
                };
                self.publish_log(&entry);
                self.publish_stats(&snapshot);
            }
        }
    }

    /// Merge a polled interceptor status into the snapshot.
    pub fn apply_interceptor_status(&self, status: &InterceptorStatus) {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            inner.stats.apply_status(status);
            inner.stats.snapshot()
        };
        self.publish_stats(&snapshot);
    }

    /// Record a simulated network transition with its log entry.
    pub fn record_network_transition(&self, online: bool) {
        let (entry, snapshot) = {
            let mut inner = self.inner.lock().unwrap();
            inner.stats.set_online(online);
            let entry = if online {
                inner.activity.append(
                    Severity::Success,
                    "Network is back online. Retrying stored requests...",
                    None,
                )
            } else {
                inner.activity.append(
                    Severity::Warning,
                    "Network went offline. Requests will be stored for retry.",
                    None,
                )
            };
            (entry, inner.stats.snapshot())
        };

        let _ = self.updates.send(StoreUpdate {
            update_type: UpdateType::Network,
            data: serde_json::json!({ "online": online }),
        });
        self.publish_log(&entry);
        self.publish_stats(&snapshot);
    }

    /// Append a free-form log entry.
    pub fn append_log(&self, severity: Severity, message: impl Into<String>) {
        let entry = {
            let mut inner = self.inner.lock().unwrap();
            inner.activity.append(severity, message, None)
        };
        self.publish_log(&entry);
    }

    /// Empty the activity log, leaving the marker entry.
    pub fn clear_logs(&self) {
        let entry = {
            let mut inner = self.inner.lock().unwrap();
            inner.activity.clear();
            inner.activity.entries().remove(0)
        };
        self.publish_log(&entry);
    }

    /// Empty the history ledger and reset the aggregate counters.
    pub fn clear_history(&self) {
        let (entry, snapshot) = {
            let mut inner = self.inner.lock().unwrap();
            inner.history.clear();
            inner.stats.reset();
            let entry = inner
                .activity
                .append(Severity::Info, "Request history and stats cleared", None);
            (entry, inner.stats.snapshot())
        };
        self.publish_log(&entry);
        self.publish_stats(&snapshot);
    }

    /// Activity log entries, newest first.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.inner.lock().unwrap().activity.entries()
    }

    /// History ledger entries, newest first.
    pub fn history(&self) -> Vec<RequestRecord> {
        self.inner.lock().unwrap().history.entries()
    }

    /// Current stats snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.lock().unwrap().stats.snapshot()
    }

    /// Number of requests currently in flight.
    pub fn active_count(&self) -> usize {
        self.inner.lock().unwrap().tracker.active_count()
    }

    /// Ids of requests currently in flight.
    pub fn active_ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().tracker.active_ids()
    }

    fn publish_request(&self, record: &RequestRecord) {
        let _ = self.updates.send(StoreUpdate {
            update_type: UpdateType::Request,
            data: serde_json::to_value(record).unwrap_or(serde_json::Value::Null),
        });
    }

    fn publish_log(&self, entry: &LogEntry) {
        let _ = self.updates.send(StoreUpdate {
            update_type: UpdateType::Log,
            data: serde_json::to_value(entry).unwrap_or(serde_json::Value::Null),
        });
    }

    fn publish_stats(&self, snapshot: &StatsSnapshot) {
        let _ = self.updates.send(StoreUpdate {
            update_type: UpdateType::Stats,
            data: serde_json::to_value(snapshot).unwrap_or(serde_json::Value::Null),
        });
    }
}

/// History, log, and counter side effects of one terminal transition. Runs
/// under the store lock; returns the appended log entry.
fn apply_completion(inner: &mut StoreInner, completion: &Completion) -> LogEntry {
    use crate::tracker::RequestStatus;

    inner.history.update_in_place(&completion.id, |record| {
        record.status = completion.status;
        record.duration_ms = Some(completion.duration_ms);
        record.status_code = completion.status_code;
        record.error = completion.error.clone();
    });

    let (severity, message, kind) = match completion.status {
        RequestStatus::Success => (
            Severity::Success,
            format!(
                "{} SUCCESS ({}ms): {}",
                completion.transport.label(),
                completion.duration_ms,
                completion.description
            ),
            OutcomeKind::Successful,
        ),
        RequestStatus::MaxRetries => (
            Severity::Warning,
            format!(
                "{} request failed after all retries ({}ms): {}",
                completion.transport.label(),
                completion.duration_ms,
                completion.description
            ),
            OutcomeKind::Failed,
        ),
        RequestStatus::Error | RequestStatus::Pending => (
            Severity::Error,
            format!(
                "{} UNEXPECTED ERROR ({}ms): {}",
                completion.transport.label(),
                completion.duration_ms,
                completion
                    .error
                    .as_deref()
                    .unwrap_or(&completion.description)
            ),
            OutcomeKind::Failed,
        ),
    };

    inner.stats.record_outcome(kind);
    inner
        .activity
        .append(severity, message, Some(completion.id.clone()))
}

fn publish_completion_metrics(completion: &Completion, active: usize) {
    let status = match completion.status {
        crate::tracker::RequestStatus::Success => "success",
        crate::tracker::RequestStatus::Error => "error",
        crate::tracker::RequestStatus::MaxRetries => "max_retries",
        crate::tracker::RequestStatus::Pending => "pending",
    };
    metrics::counter!("retryscope_requests_total",
        "transport" => completion.transport.label(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("retryscope_request_duration_seconds")
        .record(completion.duration_ms as f64 / 1000.0);
    metrics::gauge!("retryscope_active_requests").set(active as f64);
}

/// Spawn the task that wires interceptor events into the store.
///
/// Ends when the interceptor drops its sender (deactivation).
pub fn spawn_interceptor_event_loop(
    store: Arc<DashboardStore>,
    mut events: mpsc::Receiver<InterceptorEvent>,
    max_retries: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                InterceptorEvent::Retry { url, attempt } => {
                    store.record_retry_event(&url, attempt, max_retries);
                }
                InterceptorEvent::MaxRetriesExceeded { url } => {
                    let resolved = store.complete_exhausted(&url);
                    if resolved.is_empty() {
                        store.report_async_error(&format!("Max retries exceeded for {}", url));
                    }
                }
            }
        }
        tracing::debug!("Interceptor event channel closed");
    })
}
