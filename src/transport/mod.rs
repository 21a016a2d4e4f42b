//! The three consumed transport primitives
//!
//! All three ride the shared `reqwest` client; what differs is the completion
//! contract each exposes to the tracking core:
//!
//! - [`Transport::Lenient`] resolves for any HTTP status. Non-success
//!   statuses are the interceptor's retry domain: the request stays pending.
//! - [`Transport::Strict`] turns any non-success status into an error.
//! - [`Transport::Callback`] delivers the outcome through two separately
//!   registered callbacks, exactly one of which fires.
//!
//! Every failure is intercepted here and classified before it touches the
//! store; nothing propagates as an uncaught task fault.

use std::sync::Arc;
use std::time::Duration;

use crate::interceptor::{classify_message, FailureKind};
use crate::store::DashboardStore;
use crate::tracker::Outcome;

pub use crate::tracker::Transport;

/// Build the shared outbound HTTP client.
pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to create HTTP client")
}

/// Begin tracking a request and execute it through `transport`.
///
/// Returns the assigned request id immediately; the outcome is delivered to
/// the store later as an independent event.
pub fn spawn_request(
    store: Arc<DashboardStore>,
    client: reqwest::Client,
    transport: Transport,
    url: String,
    description: String,
) -> String {
    let id = store.begin_request(transport, &url, &description);

    match transport {
        Transport::Lenient => {
            let store = Arc::clone(&store);
            let id = id.clone();
            tokio::spawn(async move {
                lenient_flow(store, client, id, url).await;
            });
        }
        Transport::Strict => {
            let store = Arc::clone(&store);
            let id = id.clone();
            tokio::spawn(async move {
                strict_flow(store, client, id, url).await;
            });
        }
        Transport::Callback => {
            let on_complete = {
                let store = Arc::clone(&store);
                let id = id.clone();
                move |status_code: u16| {
                    if (200..300).contains(&status_code) {
                        let _ = store.complete_request(&id, Outcome::Success { status_code });
                    } else {
                        store.note_retryable_status(&id, status_code);
                    }
                }
            };
            let on_failure = {
                let store = Arc::clone(&store);
                let id = id.clone();
                move |message: String| {
                    complete_classified(&store, &id, message);
                }
            };
            issue_with_callbacks(client, url, on_complete, on_failure);
        }
    }

    id
}

/// Fetch-style: any HTTP response resolves. Success statuses complete the
/// request; others leave it pending for the retry domain.
async fn lenient_flow(store: Arc<DashboardStore>, client: reqwest::Client, id: String, url: String) {
    match client.get(&url).send().await {
        Ok(response) => {
            let status_code = response.status().as_u16();
            if response.status().is_success() {
                let _ = store.complete_request(&id, Outcome::Success { status_code });
            } else {
                store.note_retryable_status(&id, status_code);
            }
        }
        Err(err) => complete_classified(&store, &id, err.to_string()),
    }
}

/// Client-style: a non-success status is an error.
async fn strict_flow(store: Arc<DashboardStore>, client: reqwest::Client, id: String, url: String) {
    match client.get(&url).send().await {
        Ok(response) => {
            let status_code = response.status().as_u16();
            if response.status().is_success() {
                let _ = store.complete_request(&id, Outcome::Success { status_code });
            } else {
                let _ = store.complete_request(
                    &id,
                    Outcome::Error {
                        message: format!("request to {} returned status {}", url, status_code),
                    },
                );
            }
        }
        Err(err) => complete_classified(&store, &id, err.to_string()),
    }
}

/// Callback-style issue: exactly one of the two registered callbacks fires,
/// on a spawned task.
pub fn issue_with_callbacks<C, F>(client: reqwest::Client, url: String, on_complete: C, on_failure: F)
where
    C: FnOnce(u16) + Send + 'static,
    F: FnOnce(String) + Send + 'static,
{
    tokio::spawn(async move {
        match client.get(&url).send().await {
            Ok(response) => on_complete(response.status().as_u16()),
            Err(err) => on_failure(err.to_string()),
        }
    });
}

/// Map a boundary failure message to its terminal outcome.
fn complete_classified(store: &DashboardStore, id: &str, message: String) {
    let outcome = match classify_message(&message) {
        FailureKind::RetriesExhausted => Outcome::RetriesExhausted,
        FailureKind::Other => Outcome::Error { message },
    };
    let _ = store.complete_request(id, outcome);
}
