//! Request and response types for the console API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::tracker::Transport;

/// Body of `POST /v1/requests`: run an individual test request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunRequestBody {
    pub transport: Transport,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Response for a dispatched individual test request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequestResponse {
    pub request_id: String,
}

/// Response for `GET /v1/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub is_active: bool,
    pub is_online: bool,
    pub pending_requests: u32,
    /// Requests currently in flight through the console's transports
    pub active_requests: usize,
    pub uptime_seconds: u64,
}

/// Generic acknowledgement for command endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: Some(message.into()),
        }
    }
}

/// API error envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "invalid_request_error".to_string(),
                code: Some("invalid_request_error".to_string()),
            },
        }
    }

    /// Create a precondition failure (409), e.g. running a scenario while
    /// the interceptor is inactive.
    pub fn precondition_failed(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "precondition_error".to_string(),
                code: Some("precondition_failed".to_string()),
            },
        }
    }

    /// Create an internal error (500).
    pub fn internal(message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: "server_error".to_string(),
                code: Some("internal_error".to_string()),
            },
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            Some("precondition_failed") => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
