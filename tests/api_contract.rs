//! Contract tests for the console HTTP API and the store update schema

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{fast_scenario_config, harness};
use retryscope::api::create_router;
use retryscope::config::ConsoleConfig;
use retryscope::store::{StoreUpdate, UpdateType};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_and_stats_expose_expected_fields() {
    let harness = harness(ConsoleConfig::default());
    let app = create_router(std::sync::Arc::clone(&harness.state));

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "ok");

    let response = app.oneshot(get("/v1/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    for field in [
        "successful",
        "failed",
        "retried",
        "total",
        "is_active",
        "is_online",
        "pending_requests",
    ] {
        assert!(stats.get(field).is_some(), "missing field {}", field);
    }
}

#[tokio::test]
async fn start_stop_lifecycle_over_http() {
    let harness = harness(ConsoleConfig::default());
    let app = create_router(std::sync::Arc::clone(&harness.state));

    // Initially inactive
    let status = body_json(app.clone().oneshot(get("/v1/status")).await.unwrap()).await;
    assert_eq!(status["is_active"], false);

    // Start
    let response = app
        .clone()
        .oneshot(post("/v1/interceptor/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Starting again is a precondition failure
    let response = app
        .clone()
        .oneshot(post("/v1/interceptor/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "precondition_failed");

    let status = body_json(app.clone().oneshot(get("/v1/status")).await.unwrap()).await;
    assert_eq!(status["is_active"], true);

    // Startup log lines are visible
    let logs = body_json(app.clone().oneshot(get("/v1/logs")).await.unwrap()).await;
    let messages: Vec<String> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["message"].as_str().unwrap().to_string())
        .collect();
    assert!(messages.iter().any(|m| m.contains("Interceptor started")));
    assert!(messages.iter().any(|m| m.contains("max retries: 3")));

    // Stop
    let response = app
        .clone()
        .oneshot(post("/v1/interceptor/stop"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_json(app.oneshot(get("/v1/status")).await.unwrap()).await;
    assert_eq!(status["is_active"], false);
}

#[tokio::test]
async fn start_with_invalid_config_is_rejected() {
    let harness = harness(ConsoleConfig::default());
    let app = create_router(std::sync::Arc::clone(&harness.state));

    let request = Request::builder()
        .method("POST")
        .uri("/v1/interceptor/start")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "delay_time_ms": 1,
                "retry_interval_ms": 3000,
                "max_retries": 3,
                "enable_logging": true
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn commands_require_active_interceptor() {
    let harness = harness(ConsoleConfig::default());
    let app = create_router(std::sync::Arc::clone(&harness.state));

    for uri in [
        "/v1/scenarios/suite",
        "/v1/scenarios/offline",
        "/v1/interceptor/pending/clear",
    ] {
        let response = app.clone().oneshot(post(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT, "uri {}", uri);
    }

    // Individual test requests mirror the dashboard affordance
    let request = Request::builder()
        .method("POST")
        .uri("/v1/requests")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "transport": "strict",
                "url": "http://127.0.0.1:1/x",
                "description": "should be rejected"
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Precondition failures have no side effects
    assert!(harness.state.store.history().is_empty());
    assert_eq!(harness.state.store.active_count(), 0);
}

#[tokio::test]
async fn clear_endpoints_reset_logs_and_history() {
    let harness = harness(ConsoleConfig::default());
    harness.activate().await;
    let app = create_router(std::sync::Arc::clone(&harness.state));

    harness
        .state
        .store
        .append_log(retryscope::activity::Severity::Info, "noise");

    let response = app.clone().oneshot(post("/v1/logs/clear")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let logs = body_json(app.clone().oneshot(get("/v1/logs")).await.unwrap()).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);

    let response = app.clone().oneshot(post("/v1/history/clear")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(app.oneshot(get("/v1/stats")).await.unwrap()).await;
    assert_eq!(stats["total"], 0);
}

#[tokio::test]
async fn network_simulation_commands_update_status() {
    let harness = harness(ConsoleConfig::default());
    let app = create_router(std::sync::Arc::clone(&harness.state));

    let response = app.clone().oneshot(post("/v1/network/offline")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_json(app.clone().oneshot(get("/v1/status")).await.unwrap()).await;
    assert_eq!(status["is_online"], false);

    let response = app.clone().oneshot(post("/v1/network/online")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_json(app.oneshot(get("/v1/status")).await.unwrap()).await;
    assert_eq!(status["is_online"], true);
}

#[tokio::test]
async fn suite_command_schedules_over_http() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let harness = harness(fast_scenario_config(&server.uri()));
    harness.activate().await;
    let app = create_router(std::sync::Arc::clone(&harness.state));

    let response = app.oneshot(post("/v1/scenarios/suite")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["scheduled_steps"], 7);
    assert_eq!(body["kind"], "comprehensive_suite");
    assert!(body["run_id"].as_str().unwrap().starts_with("run-"));
}

#[test]
fn store_update_schema_round_trips() {
    let update = StoreUpdate {
        update_type: UpdateType::Stats,
        data: json!({
            "successful": 1,
            "failed": 0,
            "retried": 0,
            "total": 1,
            "is_active": true,
            "is_online": true,
            "pending_requests": 0
        }),
    };

    let serialized = serde_json::to_string(&update).unwrap();
    let deserialized: StoreUpdate = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized.update_type, UpdateType::Stats);
    assert_eq!(deserialized.data["total"], 1);
}

#[test]
fn network_update_schema_has_online_flag() {
    let update = StoreUpdate {
        update_type: UpdateType::Network,
        data: json!({ "online": false }),
    };
    let value = serde_json::to_value(&update).unwrap();
    assert_eq!(value["data"]["online"], false);
    assert!(value.get("update_type").is_some());
}
