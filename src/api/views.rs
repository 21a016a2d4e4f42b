//! Read-only view handlers exposed to the presentation layer.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::activity::LogEntry;
use crate::api::types::StatusResponse;
use crate::api::AppState;
use crate::stats::StatsSnapshot;
use crate::tracker::RequestRecord;

/// GET /v1/logs - Activity log entries, newest first.
pub async fn handle_logs(State(state): State<Arc<AppState>>) -> Json<Vec<LogEntry>> {
    Json(state.store.logs())
}

/// GET /v1/history - Request history, newest first.
pub async fn handle_history(State(state): State<Arc<AppState>>) -> Json<Vec<RequestRecord>> {
    Json(state.store.history())
}

/// GET /v1/stats - Aggregate counters plus polled interceptor fields.
pub async fn handle_stats(State(state): State<Arc<AppState>>) -> Json<StatsSnapshot> {
    Json(state.store.stats())
}

/// GET /v1/status - Live interceptor/network/console state.
pub async fn handle_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = state.interceptor.status().await;
    Json(StatusResponse {
        is_active: status.is_active,
        is_online: status.is_online,
        pending_requests: status.pending_requests,
        active_requests: state.store.active_count(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
}

/// GET /health - Liveness probe.
pub async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics - Prometheus text format.
pub async fn handle_metrics(State(state): State<Arc<AppState>>) -> String {
    state.prometheus_handle.render()
}
