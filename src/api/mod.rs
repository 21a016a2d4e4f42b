//! # Console API
//!
//! HTTP surface of the retry interceptor console: read-only views of the
//! observability store, command endpoints driving the interceptor and the
//! scenario orchestrator, and a WebSocket push of store updates. The web
//! dashboard is an external subscriber of this API; nothing here renders
//! presentation.
//!
//! ## Endpoints
//!
//! - `GET /v1/logs` / `GET /v1/history` / `GET /v1/stats` / `GET /v1/status`
//! - `GET /health` - liveness probe
//! - `GET /metrics` - Prometheus text format
//! - `GET /ws` - WebSocket store updates
//! - `POST /v1/interceptor/start` / `stop` / `pending/clear`
//! - `POST /v1/logs/clear` / `POST /v1/history/clear`
//! - `POST /v1/requests` - individual test request
//! - `POST /v1/scenarios/suite` / `POST /v1/scenarios/offline`
//! - `POST /v1/network/offline` / `POST /v1/network/online`
//!
//! ## Example
//!
//! ```no_run
//! use retryscope::api::{create_router, AppState};
//! use retryscope::config::ConsoleConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(ConsoleConfig::default());
//! let state = Arc::new(AppState::with_sim(config));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8700").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod types;
pub mod views;
pub mod websocket;

pub use types::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ConsoleConfig;
use crate::interceptor::{RetryInterceptor, SimInterceptor};
use crate::network::NetworkMonitor;
use crate::scenario::ScenarioOrchestrator;
use crate::store::DashboardStore;
use crate::transport::build_client;

/// Maximum request body size (64 KB). Command bodies are tiny.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<ConsoleConfig>,
    pub store: Arc<DashboardStore>,
    pub interceptor: Arc<dyn RetryInterceptor>,
    pub network: Arc<NetworkMonitor>,
    pub orchestrator: ScenarioOrchestrator,
    pub http_client: reqwest::Client,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    /// Prometheus handle for rendering metrics
    pub prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    /// Create application state around a given interceptor implementation.
    pub fn new(
        config: Arc<ConsoleConfig>,
        interceptor: Arc<dyn RetryInterceptor>,
        network: Arc<NetworkMonitor>,
    ) -> Self {
        let store = Arc::new(DashboardStore::new(&config.tracking));
        let http_client = build_client(Duration::from_secs(config.server.request_timeout_seconds));

        // Initialize metrics (safe to call multiple times - reuses a detached
        // handle if a recorder is already installed, e.g. in tests)
        let prometheus_handle = crate::stats::setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics already initialized, creating new handle: {}", e);
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .build_recorder()
                .handle()
        });

        let orchestrator = ScenarioOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&interceptor),
            Arc::clone(&network),
            http_client.clone(),
            config.scenario.clone(),
        );

        Self {
            config,
            store,
            interceptor,
            network,
            orchestrator,
            http_client,
            start_time: Instant::now(),
            prometheus_handle,
        }
    }

    /// Create application state wired to the simulated interceptor stand-in.
    pub fn with_sim(config: Arc<ConsoleConfig>) -> Self {
        let network = Arc::new(NetworkMonitor::new());
        let interceptor: Arc<dyn RetryInterceptor> =
            Arc::new(SimInterceptor::new(Arc::clone(&network)));
        Self::new(config, interceptor, network)
    }
}

/// Create the console router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/logs", get(views::handle_logs))
        .route("/v1/history", get(views::handle_history))
        .route("/v1/stats", get(views::handle_stats))
        .route("/v1/status", get(views::handle_status))
        .route("/health", get(views::handle_health))
        .route("/metrics", get(views::handle_metrics))
        .route("/ws", get(websocket::websocket_handler))
        .route("/v1/interceptor/start", post(commands::handle_start))
        .route("/v1/interceptor/stop", post(commands::handle_stop))
        .route(
            "/v1/interceptor/pending/clear",
            post(commands::handle_clear_pending),
        )
        .route("/v1/logs/clear", post(commands::handle_clear_logs))
        .route("/v1/history/clear", post(commands::handle_clear_history))
        .route("/v1/requests", post(commands::handle_run_request))
        .route("/v1/scenarios/suite", post(commands::handle_run_suite))
        .route(
            "/v1/scenarios/offline",
            post(commands::handle_run_offline_scenario),
        )
        .route("/v1/network/offline", post(commands::handle_simulate_offline))
        .route("/v1/network/online", post(commands::handle_simulate_online))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .with_state(state)
}
