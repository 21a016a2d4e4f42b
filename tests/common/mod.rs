//! Shared helpers for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use retryscope::api::AppState;
use retryscope::config::{ConsoleConfig, InterceptorConfig};
use retryscope::interceptor::{RetryInterceptor, SimInterceptor};
use retryscope::network::NetworkMonitor;
use retryscope::store::spawn_interceptor_event_loop;

/// Test harness exposing the concrete simulated interceptor alongside the
/// application state built around it.
pub struct TestHarness {
    pub state: Arc<AppState>,
    pub sim: Arc<SimInterceptor>,
    pub network: Arc<NetworkMonitor>,
}

/// Build a harness around the given configuration.
pub fn harness(config: ConsoleConfig) -> TestHarness {
    let network = Arc::new(NetworkMonitor::new());
    let sim = Arc::new(SimInterceptor::new(Arc::clone(&network)));
    let state = Arc::new(AppState::new(
        Arc::new(config),
        Arc::clone(&sim) as Arc<dyn RetryInterceptor>,
        Arc::clone(&network),
    ));
    TestHarness {
        state,
        sim,
        network,
    }
}

impl TestHarness {
    /// Activate the simulated interceptor and wire its events into the store,
    /// the way the start command does.
    pub async fn activate(&self) {
        let config = InterceptorConfig::default();
        let (tx, rx) = tokio::sync::mpsc::channel(64);
        self.sim
            .activate(config.clone(), tx)
            .await
            .expect("activate sim interceptor");
        spawn_interceptor_event_loop(
            Arc::clone(&self.state.store),
            rx,
            config.max_retries,
        );
        let status = self.sim.status().await;
        self.state.store.apply_interceptor_status(&status);
    }
}

/// Config pointing all scenario traffic at `base` with fast step timing.
pub fn fast_scenario_config(base: &str) -> ConsoleConfig {
    let mut config = ConsoleConfig::default();
    config.scenario.probe_base_url = base.to_string();
    config.scenario.error_base_url = base.to_string();
    config.scenario.suite_step_ms = 20;
    config.scenario.offline_request_delay_ms = 30;
    config.scenario.online_restore_delay_ms = 120;
    config
}

/// Poll until `predicate` holds, panicking after `timeout`.
pub async fn wait_until<F>(mut predicate: F, timeout: Duration, what: &str)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if predicate() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {}", what);
}
