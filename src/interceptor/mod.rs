//! Consumed interface of the external retry interceptor
//!
//! The retry/backoff/offline-queue engine is an external collaborator; this
//! module defines the control surface the console drives and the structured
//! event contract it observes. Retry and exhaustion notifications arrive on an
//! mpsc channel registered at activation, replacing fragile error-message
//! sniffing with typed events. A message classifier is still provided as the
//! boundary fallback for foreign error strings.

pub mod sim;

pub use sim::SimInterceptor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::InterceptorConfig;

/// Snapshot of the interceptor's own state, returned by [`RetryInterceptor::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorStatus {
    pub is_active: bool,
    pub is_online: bool,
    pub pending_requests: u32,
}

/// Asynchronous notifications emitted by the interceptor while active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptorEvent {
    /// A request is being retried
    Retry { url: String, attempt: u32 },
    /// A request exhausted its retry budget
    MaxRetriesExceeded { url: String },
}

/// Errors from the interceptor control surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterceptorError {
    #[error("interceptor is already active")]
    AlreadyActive,

    #[error("interceptor is not active")]
    NotActive,
}

/// Control surface of the external retry interceptor.
///
/// `activate` registers the event channel; the implementation drops its
/// sender on `deactivate`, closing the channel.
#[async_trait]
pub trait RetryInterceptor: Send + Sync {
    /// Start the interceptor. Fails if already active.
    async fn activate(
        &self,
        config: InterceptorConfig,
        events: mpsc::Sender<InterceptorEvent>,
    ) -> Result<(), InterceptorError>;

    /// Stop the interceptor and clear its internal pending queue.
    async fn deactivate(&self) -> Result<(), InterceptorError>;

    /// Current state.
    async fn status(&self) -> InterceptorStatus;

    /// Number of requests waiting in the interceptor's internal queue.
    async fn count_pending(&self) -> u32;

    /// Drop the internal queue; returns how many requests were cleared.
    async fn clear_pending(&self) -> u32;
}

/// Classification of an asynchronous failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Expected exhausted-retry failure, a normal outcome
    RetriesExhausted,
    /// Anything else
    Other,
}

/// Classify a failure by message. Fallback path for errors that arrive as
/// plain strings instead of typed events.
pub fn classify_message(message: &str) -> FailureKind {
    if message.to_lowercase().contains("max retries exceeded") {
        FailureKind::RetriesExhausted
    } else {
        FailureKind::Other
    }
}

/// Extract the first URL-shaped substring from an error message.
pub fn extract_url(message: &str) -> Option<&str> {
    let start = message
        .find("https://")
        .or_else(|| message.find("http://"))?;
    let rest = &message[start..];
    let end = rest
        .find(|c: char| c.is_whitespace())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
