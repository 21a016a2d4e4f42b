//! Comprehensive test suite scenario, end to end against a mock server
//!
//! Drives the scripted suite through real transports, then resolves the
//! retry-domain requests with interceptor exhaustion events, checking the
//! final counter shape: total 7, at least 4 failed, at most 3 successful.

mod common;

use std::time::Duration;

use common::{fast_scenario_config, harness, wait_until};
use retryscope::interceptor::InterceptorEvent;
use retryscope::scenario::ScenarioError;
use retryscope::tracker::RequestStatus;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_suite_endpoints(server: &MockServer) {
    for (route, status) in [
        ("/posts/1", 200),
        ("/users/1", 200),
        ("/posts/2", 200),
        ("/500", 500),
        ("/503", 503),
        ("/502", 502),
        ("/429", 429),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn comprehensive_suite_reaches_expected_totals() {
    let server = MockServer::start().await;
    mount_suite_endpoints(&server).await;

    let harness = harness(fast_scenario_config(&server.uri()));
    harness.activate().await;

    let scheduled = harness
        .state
        .orchestrator
        .run_comprehensive_suite()
        .await
        .unwrap();
    assert_eq!(scheduled.scheduled_steps, 7);

    // All 7 sub-requests fire and 5 resolve on their own; the lenient 500 and
    // callback 502 stay pending for the interceptor's retry domain
    let store = std::sync::Arc::clone(&harness.state.store);
    wait_until(
        || store.stats().total == 5 && store.active_count() == 2,
        Duration::from_secs(5),
        "five terminal outcomes and two retry-domain requests",
    )
    .await;

    // The interceptor reports exhaustion for both retry-domain URLs
    for route in ["/500", "/502"] {
        assert!(
            harness
                .sim
                .emit(InterceptorEvent::MaxRetriesExceeded {
                    url: format!("{}{}", server.uri(), route),
                })
                .await
        );
    }

    wait_until(
        || store.active_count() == 0,
        Duration::from_secs(5),
        "retry-domain requests resolved by exhaustion events",
    )
    .await;

    let stats = store.stats();
    assert_eq!(stats.total, 7);
    assert!(stats.failed >= 4, "failed = {}", stats.failed);
    assert!(stats.successful <= 3, "successful = {}", stats.successful);
    assert_eq!(stats.total, stats.successful + stats.failed);

    // History holds one terminal record per sub-request
    let history = store.history();
    assert_eq!(history.len(), 7);
    assert!(history.iter().all(|record| record.status.is_terminal()));
    assert_eq!(
        history
            .iter()
            .filter(|record| record.status == RequestStatus::MaxRetries)
            .count(),
        2
    );
}

#[tokio::test]
async fn suite_without_active_interceptor_schedules_nothing() {
    let server = MockServer::start().await;
    let harness = harness(fast_scenario_config(&server.uri()));

    let err = harness
        .state
        .orchestrator
        .run_comprehensive_suite()
        .await
        .unwrap_err();
    assert_eq!(err, ScenarioError::InterceptorInactive);

    // Zero requests scheduled, zero log entries
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.state.store.active_count(), 0);
    assert!(harness.state.store.history().is_empty());
    assert!(harness.state.store.logs().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn retry_events_during_suite_count_as_retries() {
    let server = MockServer::start().await;
    mount_suite_endpoints(&server).await;

    let harness = harness(fast_scenario_config(&server.uri()));
    harness.activate().await;

    harness
        .state
        .orchestrator
        .run_comprehensive_suite()
        .await
        .unwrap();

    let url = format!("{}/500", server.uri());
    for attempt in 1..=3 {
        assert!(
            harness
                .sim
                .emit(InterceptorEvent::Retry {
                    url: url.clone(),
                    attempt,
                })
                .await
        );
    }

    let store = std::sync::Arc::clone(&harness.state.store);
    wait_until(
        || store.stats().retried == 3,
        Duration::from_secs(5),
        "three retry events recorded",
    )
    .await;

    let stats = store.stats();
    assert_eq!(stats.retried, 3);
    // Retries never count toward total
    assert_eq!(stats.total, stats.successful + stats.failed);
}
