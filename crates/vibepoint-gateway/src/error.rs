//! Gateway error types.

use serde::Deserialize;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error code the backend returns while suggestions are still being computed.
pub const PLACEMENT_NOT_FOUND: &str = "PLACEMENT_NOT_FOUND";

/// Errors that can occur while talking to the analysis backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Analysis has not produced placements yet. Not a failure while polling.
    #[error("Suggestions not ready: {0}")]
    NotReady(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error body shapes the backend emits:
/// `{"detail": "...", "error_code": "..."}` or
/// `{"detail": {"detail": "...", "error_code": "..."}}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<String>,
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn code(&self) -> Option<String> {
        self.error_code.clone().or_else(|| {
            self.detail
                .as_ref()
                .and_then(|d| d.get("error_code"))
                .and_then(|c| c.as_str())
                .map(str::to_string)
        })
    }

    fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            nested => nested.get("detail").and_then(|d| d.as_str()).map(str::to_string),
        }
    }
}

impl GatewayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map a non-2xx response to an error, reading the backend's error code.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let parsed = ErrorBody::parse(&body);
        let message = parsed.message().unwrap_or_else(|| body.clone());

        match parsed.code() {
            Some(code) if code == PLACEMENT_NOT_FOUND => Self::NotReady(message),
            code => Self::Status {
                status,
                code,
                message,
            },
        }
    }

    /// True when the backend reported that analysis results are not there yet.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, GatewayError::NotReady(_))
    }

    /// Check if error is transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(_) | GatewayError::NotReady(_) => true,
            GatewayError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status associated with the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            GatewayError::NotReady(_) => Some(404),
            GatewayError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Backend error code, if the body carried one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            GatewayError::Status { code, .. } => code.as_deref(),
            GatewayError::NotReady(_) => Some(PLACEMENT_NOT_FOUND),
            _ => None,
        }
    }
}
