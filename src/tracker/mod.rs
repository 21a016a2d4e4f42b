//! Request identity and lifecycle tracking
//!
//! Assigns a process-unique id to every initiated request, holds the set of
//! in-flight requests, and enforces the exactly-once transition from pending
//! to a terminal state. Terminal records live on only in the history ledger;
//! completing an id that is no longer pending is a consistency defect and
//! leaves state unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// One of the three request-issuing styles, named by completion contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Resolves for any HTTP status; only a transport failure is an error
    Lenient,
    /// Treats any non-success HTTP status as an error
    Strict,
    /// Delivers the outcome through separately registered callbacks
    Callback,
}

impl Transport {
    /// Uppercase tag used in log lines and history badges.
    pub fn label(&self) -> &'static str {
        match self {
            Transport::Lenient => "LENIENT",
            Transport::Strict => "STRICT",
            Transport::Callback => "CALLBACK",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of a tracked request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Success,
    Error,
    MaxRetries,
}

impl RequestStatus {
    /// A terminal status can never be left.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// Terminal outcome reported by a transport or the interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Completed with a success HTTP status
    Success { status_code: u16 },
    /// Failed with a transport or HTTP error
    Error { message: String },
    /// The external interceptor exhausted its retries for this request
    RetriesExhausted,
}

impl Outcome {
    /// The terminal status this outcome transitions a request into.
    pub fn status(&self) -> RequestStatus {
        match self {
            Outcome::Success { .. } => RequestStatus::Success,
            Outcome::Error { .. } => RequestStatus::Error,
            Outcome::RetriesExhausted => RequestStatus::MaxRetries,
        }
    }
}

/// Summary of one tracked request, as shown in the history ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Process-unique id, never reused
    pub id: String,
    pub transport: Transport,
    pub url: String,
    pub description: String,
    /// Wall-clock creation time
    pub started_at: DateTime<Utc>,
    pub status: RequestStatus,
    /// Set exactly once, at the terminal transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An initiated request that has not yet reached a terminal state.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub transport: Transport,
    pub url: String,
    pub description: String,
    /// Monotonic start, used to compute the terminal duration
    pub started: Instant,
    pub started_at: DateTime<Utc>,
}

/// Result of a terminal transition, handed to the store for history/log/stat
/// side effects.
#[derive(Debug, Clone)]
pub struct Completion {
    pub id: String,
    pub transport: Transport,
    pub url: String,
    pub description: String,
    pub status: RequestStatus,
    pub duration_ms: u64,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

/// Consistency defects surfaced by the tracker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// Completion for an id that is unknown or already terminal
    #[error("no pending request with id {0}")]
    UnknownRequest(String),
}

/// Tracks all in-flight requests and generates their identities.
#[derive(Debug, Default)]
pub struct RequestTracker {
    pending: HashMap<String, InFlight>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Begin tracking a request: generate a fresh id, register it as
    /// in-flight, and return the initial pending record.
    pub fn begin(&mut self, transport: Transport, url: &str, description: &str) -> RequestRecord {
        let id = format!("req-{}", uuid::Uuid::new_v4());
        let started_at = Utc::now();

        self.pending.insert(
            id.clone(),
            InFlight {
                transport,
                url: url.to_string(),
                description: description.to_string(),
                started: Instant::now(),
                started_at,
            },
        );

        RequestRecord {
            id,
            transport,
            url: url.to_string(),
            description: description.to_string(),
            started_at,
            status: RequestStatus::Pending,
            duration_ms: None,
            status_code: None,
            error: None,
        }
    }

    /// Transition a pending request into the terminal state named by
    /// `outcome`, exactly once.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::UnknownRequest` when the id is not pending
    /// (double completion or a completion for an id never issued). State is
    /// left unchanged in that case.
    pub fn complete(&mut self, id: &str, outcome: &Outcome) -> Result<Completion, TrackerError> {
        let in_flight = self
            .pending
            .remove(id)
            .ok_or_else(|| TrackerError::UnknownRequest(id.to_string()))?;

        let duration_ms = in_flight.started.elapsed().as_millis() as u64;
        let (status_code, error) = match outcome {
            Outcome::Success { status_code } => (Some(*status_code), None),
            Outcome::Error { message } => (None, Some(message.clone())),
            Outcome::RetriesExhausted => (None, Some("max retries exceeded".to_string())),
        };

        Ok(Completion {
            id: id.to_string(),
            transport: in_flight.transport,
            url: in_flight.url,
            description: in_flight.description,
            status: outcome.status(),
            duration_ms,
            status_code,
            error,
        })
    }

    /// Look up an in-flight request without changing its state.
    pub fn pending(&self, id: &str) -> Option<&InFlight> {
        self.pending.get(id)
    }

    /// Ids of all pending requests issued against `url`.
    ///
    /// The external interceptor reports exhaustion per URL, not per id; every
    /// pending request on that URL is resolved by such a report.
    pub fn pending_ids_for_url(&self, url: &str) -> Vec<String> {
        self.pending
            .iter()
            .filter(|(_, in_flight)| in_flight.url == url)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of requests currently in flight.
    pub fn active_count(&self) -> usize {
        self.pending.len()
    }

    /// Ids of all requests currently in flight.
    pub fn active_ids(&self) -> Vec<String> {
        self.pending.keys().cloned().collect()
    }
}
