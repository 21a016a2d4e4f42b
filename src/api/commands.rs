//! Command handlers exposed to the presentation layer.
//!
//! Every command is a thin adapter: precondition check, one call into the
//! interceptor control surface / store / orchestrator, and the log lines the
//! dashboard shows for it.

use axum::{extract::State, Json};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::activity::Severity;
use crate::api::types::{ApiError, CommandResponse, RunRequestBody, RunRequestResponse};
use crate::api::AppState;
use crate::config::InterceptorConfig;
use crate::interceptor::InterceptorError;
use crate::scenario::{ScenarioError, ScheduledScenario};
use crate::store::spawn_interceptor_event_loop;
use crate::transport::spawn_request;

/// Capacity of the interceptor event channel registered at activation.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// POST /v1/interceptor/start
///
/// Activate the external interceptor. The request body may override the
/// configured activation parameters.
pub async fn handle_start(
    State(state): State<Arc<AppState>>,
    body: Option<Json<InterceptorConfig>>,
) -> Result<Json<CommandResponse>, ApiError> {
    let config = body
        .map(|Json(config)| config)
        .unwrap_or_else(|| state.config.interceptor.clone());
    config.validate().map_err(|e| ApiError::bad_request(&e))?;

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    match state.interceptor.activate(config.clone(), tx).await {
        Ok(()) => {}
        Err(InterceptorError::AlreadyActive) => {
            return Err(ApiError::precondition_failed("Interceptor is already active"));
        }
        Err(e) => return Err(ApiError::internal(&e.to_string())),
    }

    spawn_interceptor_event_loop(Arc::clone(&state.store), rx, config.max_retries);

    state
        .store
        .append_log(Severity::Success, "Interceptor started with config:");
    state.store.append_log(
        Severity::Info,
        format!("  delay time: {}ms", config.delay_time_ms),
    );
    state.store.append_log(
        Severity::Info,
        format!("  retry interval: {}ms", config.retry_interval_ms),
    );
    state
        .store
        .append_log(Severity::Info, format!("  max retries: {}", config.max_retries));

    let status = state.interceptor.status().await;
    state.store.apply_interceptor_status(&status);

    tracing::info!(
        delay_time_ms = config.delay_time_ms,
        retry_interval_ms = config.retry_interval_ms,
        max_retries = config.max_retries,
        "Interceptor activated"
    );
    Ok(Json(CommandResponse::with_message("interceptor started")))
}

/// POST /v1/interceptor/stop
pub async fn handle_stop(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse>, ApiError> {
    match state.interceptor.deactivate().await {
        Ok(()) => {}
        Err(InterceptorError::NotActive) => {
            return Err(ApiError::precondition_failed("Interceptor is not active"));
        }
        Err(e) => return Err(ApiError::internal(&e.to_string())),
    }

    state.store.append_log(
        Severity::Info,
        "Interceptor stopped. All pending requests cleared.",
    );
    let status = state.interceptor.status().await;
    state.store.apply_interceptor_status(&status);

    tracing::info!("Interceptor deactivated");
    Ok(Json(CommandResponse::with_message("interceptor stopped")))
}

/// POST /v1/interceptor/pending/clear
pub async fn handle_clear_pending(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse>, ApiError> {
    if !state.interceptor.status().await.is_active {
        return Err(ApiError::precondition_failed("Interceptor is not active"));
    }

    let cleared = state.interceptor.clear_pending().await;
    state.store.append_log(
        Severity::Info,
        format!("Cleared {} pending requests", cleared),
    );
    let status = state.interceptor.status().await;
    state.store.apply_interceptor_status(&status);

    Ok(Json(CommandResponse::with_message(format!(
        "cleared {} pending requests",
        cleared
    ))))
}

/// POST /v1/logs/clear
pub async fn handle_clear_logs(State(state): State<Arc<AppState>>) -> Json<CommandResponse> {
    state.store.clear_logs();
    Json(CommandResponse::ok())
}

/// POST /v1/history/clear
pub async fn handle_clear_history(State(state): State<Arc<AppState>>) -> Json<CommandResponse> {
    state.store.clear_history();
    Json(CommandResponse::ok())
}

/// POST /v1/requests - run an individual test request.
///
/// Mirrors the dashboard affordance: rejected while the interceptor is
/// inactive.
pub async fn handle_run_request(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunRequestBody>,
) -> Result<Json<RunRequestResponse>, ApiError> {
    if !state.interceptor.status().await.is_active {
        return Err(ApiError::precondition_failed("Start the interceptor first"));
    }
    if body.url.is_empty() {
        return Err(ApiError::bad_request("url must not be empty"));
    }

    let description = if body.description.is_empty() {
        format!("Manual {} test", body.transport.label().to_lowercase())
    } else {
        body.description
    };

    let request_id = spawn_request(
        Arc::clone(&state.store),
        state.http_client.clone(),
        body.transport,
        body.url,
        description,
    );
    Ok(Json(RunRequestResponse { request_id }))
}

/// POST /v1/scenarios/suite - run the comprehensive test suite.
pub async fn handle_run_suite(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScheduledScenario>, ApiError> {
    state
        .orchestrator
        .run_comprehensive_suite()
        .await
        .map(Json)
        .map_err(scenario_error)
}

/// POST /v1/scenarios/offline - run the offline/online scenario.
pub async fn handle_run_offline_scenario(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScheduledScenario>, ApiError> {
    state
        .orchestrator
        .run_offline_scenario()
        .await
        .map(Json)
        .map_err(scenario_error)
}

/// POST /v1/network/offline
pub async fn handle_simulate_offline(State(state): State<Arc<AppState>>) -> Json<CommandResponse> {
    state.orchestrator.simulate_offline();
    Json(CommandResponse::ok())
}

/// POST /v1/network/online
pub async fn handle_simulate_online(State(state): State<Arc<AppState>>) -> Json<CommandResponse> {
    state.orchestrator.simulate_online();
    Json(CommandResponse::ok())
}

fn scenario_error(err: ScenarioError) -> ApiError {
    match err {
        ScenarioError::InterceptorInactive => {
            ApiError::precondition_failed("Start the interceptor first")
        }
    }
}
