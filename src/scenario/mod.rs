//! Scenario orchestration
//!
//! Drives the scripted demonstration sequences: the comprehensive test suite
//! and the offline/online scenario. Pure orchestration: everything it does
//! is a call into the store, the transports, the network monitor, or the
//! interceptor control surface. The only state it holds is the registry of
//! per-run timer tokens.
//!
//! Scheduled steps are independent one-shot timers. Tokens are collected per
//! run but never cancelled: stopping the interceptor mid-suite does not
//! cancel already-scheduled requests. Known limitation; the token registry is
//! the hook for changing it.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::activity::Severity;
use crate::config::ScenarioConfig;
use crate::interceptor::RetryInterceptor;
use crate::network::NetworkMonitor;
use crate::store::DashboardStore;
use crate::transport::{spawn_request, Transport};

/// Scenario preconditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("interceptor must be active before running scenarios")]
    InterceptorInactive,
}

/// Which scripted sequence a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    ComprehensiveSuite,
    OfflineOnline,
}

/// Handle describing a scheduled scenario run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScheduledScenario {
    pub run_id: String,
    pub kind: ScenarioKind,
    /// Number of deferred steps scheduled
    pub scheduled_steps: usize,
}

struct ScenarioRun {
    #[allow(dead_code)]
    kind: ScenarioKind,
    /// One token per scheduled step; collected, never cancelled
    #[allow(dead_code)]
    timers: Vec<CancellationToken>,
}

struct SuiteStep {
    transport: Transport,
    url: String,
    description: String,
    /// First error-path step logs the introductory warning
    warn_before: bool,
}

/// Orchestrates the scripted demonstration sequences.
pub struct ScenarioOrchestrator {
    store: Arc<DashboardStore>,
    interceptor: Arc<dyn RetryInterceptor>,
    network: Arc<NetworkMonitor>,
    client: reqwest::Client,
    config: ScenarioConfig,
    runs: DashMap<String, ScenarioRun>,
}

impl ScenarioOrchestrator {
    pub fn new(
        store: Arc<DashboardStore>,
        interceptor: Arc<dyn RetryInterceptor>,
        network: Arc<NetworkMonitor>,
        client: reqwest::Client,
        config: ScenarioConfig,
    ) -> Self {
        Self {
            store,
            interceptor,
            network,
            client,
            config,
            runs: DashMap::new(),
        }
    }

    /// Number of scenario runs started so far.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Flip the simulated network flag offline, dispatching the transition.
    pub fn simulate_offline(&self) {
        self.store.append_log(
            Severity::Warning,
            "Simulating offline mode... All new requests will be stored.",
        );
        if self.network.set_online(false) {
            self.store.record_network_transition(false);
        }
    }

    /// Flip the simulated network flag online, dispatching the transition.
    pub fn simulate_online(&self) {
        self.store.append_log(
            Severity::Success,
            "Simulating online mode... Stored requests will be retried.",
        );
        if self.network.set_online(true) {
            self.store.record_network_transition(true);
        }
    }

    /// Schedule the comprehensive test suite: three success-path requests
    /// across the three transports, then four error-path requests, at fixed
    /// increments from suite start.
    ///
    /// # Errors
    ///
    /// `ScenarioError::InterceptorInactive` when the interceptor is not
    /// active; nothing is scheduled and no log is written beyond the
    /// precondition report by the caller.
    pub async fn run_comprehensive_suite(&self) -> Result<ScheduledScenario, ScenarioError> {
        self.require_active().await?;

        self.store
            .append_log(Severity::Info, "Starting comprehensive test suite...");
        self.store.append_log(
            Severity::Info,
            "Error-path requests are expected to fail after retries - that is the interceptor working",
        );

        let steps = self.suite_steps();
        let scheduled_steps = steps.len();
        let run_id = format!("run-{}", uuid::Uuid::new_v4());
        let mut timers = Vec::with_capacity(scheduled_steps);

        for (index, step) in steps.into_iter().enumerate() {
            let delay = Duration::from_millis(self.config.suite_step_ms * (index as u64 + 1));
            let token = CancellationToken::new();
            timers.push(token.clone());

            let store = Arc::clone(&self.store);
            let client = self.client.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        if step.warn_before {
                            store.append_log(
                                Severity::Warning,
                                "Starting error tests - these will retry then fail (expected behavior)",
                            );
                        }
                        spawn_request(store, client, step.transport, step.url, step.description);
                    }
                }
            });
        }

        self.runs.insert(
            run_id.clone(),
            ScenarioRun {
                kind: ScenarioKind::ComprehensiveSuite,
                timers,
            },
        );
        tracing::info!(run_id = %run_id, steps = scheduled_steps, "Comprehensive suite scheduled");

        Ok(ScheduledScenario {
            run_id,
            kind: ScenarioKind::ComprehensiveSuite,
            scheduled_steps,
        })
    }

    /// Run the three-step offline/online scenario: flip offline now, issue two
    /// requests while offline, restore the flag later.
    pub async fn run_offline_scenario(&self) -> Result<ScheduledScenario, ScenarioError> {
        self.require_active().await?;

        self.store
            .append_log(Severity::Info, "Starting offline scenario test...");

        // Step 1: immediate
        self.store
            .append_log(Severity::Warning, "Step 1: going offline...");
        self.simulate_offline();

        let run_id = format!("run-{}", uuid::Uuid::new_v4());
        let mut timers = Vec::with_capacity(2);

        // Step 2: requests issued while offline
        {
            let token = CancellationToken::new();
            timers.push(token.clone());
            let store = Arc::clone(&self.store);
            let client = self.client.clone();
            let delay = Duration::from_millis(self.config.offline_request_delay_ms);
            let probe = self.config.probe_base_url.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        store.append_log(
                            Severity::Info,
                            "Step 2: making requests while offline (should be stored)...",
                        );
                        spawn_request(
                            Arc::clone(&store),
                            client.clone(),
                            Transport::Lenient,
                            format!("{}/posts/1", probe),
                            "Offline test: should be stored".to_string(),
                        );
                        spawn_request(
                            store,
                            client,
                            Transport::Strict,
                            format!("{}/users/1", probe),
                            "Offline test: should be stored".to_string(),
                        );
                    }
                }
            });
        }

        // Step 3: restore the network flag
        {
            let token = CancellationToken::new();
            timers.push(token.clone());
            let store = Arc::clone(&self.store);
            let network = Arc::clone(&self.network);
            let delay = Duration::from_millis(self.config.online_restore_delay_ms);
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        store.append_log(
                            Severity::Success,
                            "Step 3: going back online (stored requests should execute)...",
                        );
                        store.append_log(
                            Severity::Success,
                            "Simulating online mode... Stored requests will be retried.",
                        );
                        if network.set_online(true) {
                            store.record_network_transition(true);
                        }
                    }
                }
            });
        }

        self.runs.insert(
            run_id.clone(),
            ScenarioRun {
                kind: ScenarioKind::OfflineOnline,
                timers,
            },
        );
        tracing::info!(run_id = %run_id, "Offline scenario scheduled");

        Ok(ScheduledScenario {
            run_id,
            kind: ScenarioKind::OfflineOnline,
            scheduled_steps: 2,
        })
    }

    async fn require_active(&self) -> Result<(), ScenarioError> {
        if self.interceptor.status().await.is_active {
            Ok(())
        } else {
            Err(ScenarioError::InterceptorInactive)
        }
    }

    fn suite_steps(&self) -> Vec<SuiteStep> {
        let probe = &self.config.probe_base_url;
        let error = &self.config.error_base_url;
        vec![
            SuiteStep {
                transport: Transport::Lenient,
                url: format!("{}/posts/1", probe),
                description: "Lenient fetch: get post #1".to_string(),
                warn_before: false,
            },
            SuiteStep {
                transport: Transport::Strict,
                url: format!("{}/users/1", probe),
                description: "Strict client: get user #1".to_string(),
                warn_before: false,
            },
            SuiteStep {
                transport: Transport::Callback,
                url: format!("{}/posts/2", probe),
                description: "Callback client: get post #2".to_string(),
                warn_before: false,
            },
            SuiteStep {
                transport: Transport::Lenient,
                url: format!("{}/500", error),
                description: "Lenient fetch: server error (500) - will retry then fail".to_string(),
                warn_before: true,
            },
            SuiteStep {
                transport: Transport::Strict,
                url: format!("{}/503", error),
                description: "Strict client: service unavailable (503) - will retry then fail"
                    .to_string(),
                warn_before: false,
            },
            SuiteStep {
                transport: Transport::Callback,
                url: format!("{}/502", error),
                description: "Callback client: bad gateway (502) - will retry then fail".to_string(),
                warn_before: false,
            },
            SuiteStep {
                transport: Transport::Strict,
                url: format!("{}/429", error),
                description: "Strict client: rate limited (429) - will retry then fail".to_string(),
                warn_before: false,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InterceptorConfig, TrackingConfig};
    use crate::interceptor::SimInterceptor;
    use crate::transport::build_client;
    use tokio::sync::mpsc;

    fn make_orchestrator(config: ScenarioConfig) -> (ScenarioOrchestrator, Arc<SimInterceptor>) {
        let store = Arc::new(DashboardStore::new(&TrackingConfig::default()));
        let network = Arc::new(NetworkMonitor::new());
        let sim = Arc::new(SimInterceptor::new(Arc::clone(&network)));
        let orchestrator = ScenarioOrchestrator::new(
            store,
            Arc::clone(&sim) as Arc<dyn RetryInterceptor>,
            network,
            build_client(Duration::from_secs(2)),
            config,
        );
        (orchestrator, sim)
    }

    async fn activate(sim: &SimInterceptor) {
        let (tx, _rx) = mpsc::channel(8);
        sim.activate(InterceptorConfig::default(), tx).await.unwrap();
    }

    #[tokio::test]
    async fn suite_requires_active_interceptor() {
        let (orchestrator, _sim) = make_orchestrator(ScenarioConfig::default());

        let err = orchestrator.run_comprehensive_suite().await.unwrap_err();
        assert_eq!(err, ScenarioError::InterceptorInactive);

        // No side effects: nothing scheduled, nothing logged
        assert_eq!(orchestrator.run_count(), 0);
        assert!(orchestrator.store.logs().is_empty());
        assert_eq!(orchestrator.store.active_count(), 0);
    }

    #[tokio::test]
    async fn offline_scenario_requires_active_interceptor() {
        let (orchestrator, _sim) = make_orchestrator(ScenarioConfig::default());
        let err = orchestrator.run_offline_scenario().await.unwrap_err();
        assert_eq!(err, ScenarioError::InterceptorInactive);
        assert!(orchestrator.network.is_online());
    }

    #[tokio::test]
    async fn suite_schedules_seven_steps() {
        let (orchestrator, sim) = make_orchestrator(ScenarioConfig::default());
        activate(&sim).await;

        let scheduled = orchestrator.run_comprehensive_suite().await.unwrap();
        assert_eq!(scheduled.kind, ScenarioKind::ComprehensiveSuite);
        assert_eq!(scheduled.scheduled_steps, 7);
        assert_eq!(orchestrator.run_count(), 1);
    }

    #[tokio::test]
    async fn offline_scenario_flips_flag_and_restores_it() {
        let config = ScenarioConfig {
            probe_base_url: "http://127.0.0.1:1".to_string(),
            offline_request_delay_ms: 20,
            online_restore_delay_ms: 60,
            ..Default::default()
        };
        let (orchestrator, sim) = make_orchestrator(config);
        activate(&sim).await;

        orchestrator.run_offline_scenario().await.unwrap();
        // Step 1 is immediate
        assert!(!orchestrator.network.is_online());
        assert!(!orchestrator.store.stats().is_online);

        // Step 3 restores the flag
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(orchestrator.network.is_online());
        assert!(orchestrator.store.stats().is_online);

        // Step 2 issued two requests during the offline window
        assert_eq!(orchestrator.store.history().len(), 2);
    }

    #[tokio::test]
    async fn simulate_offline_twice_dispatches_one_transition() {
        let (orchestrator, _sim) = make_orchestrator(ScenarioConfig::default());

        orchestrator.simulate_offline();
        orchestrator.simulate_offline();

        let transitions = orchestrator
            .store
            .logs()
            .iter()
            .filter(|entry| entry.message.contains("Network went offline"))
            .count();
        assert_eq!(transitions, 1);
    }
}
