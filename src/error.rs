//! Error taxonomy shared by the gateway, the capture sources and the views.
//!
//! Three layers:
//!   - `GatewayError`: what a single AI call can fail with
//!   - `CaptureError`: geolocation / image sources
//!   - `TaskError`: what a View Controller records in its Failed state

use serde::Serialize;

/// Failure of one AI Gateway invocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// Network error, service unreachable, missing credential or non-2xx status.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Payload was empty, not JSON, or did not conform to the response schema.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The caller abandoned the call before it completed.
    #[error("Request cancelled")]
    Cancelled,
}

/// The URL is stripped so request details never reach logs or screens.
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.without_url().to_string())
    }
}

/// Failure of an input capability (geolocation, image selection).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Input unavailable: {0}")]
    Unavailable(String),

    #[error("Unreadable image: {0}")]
    Unreadable(String),
}

/// Fieldless error category, for matching in views and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    TransportFailure,
    MalformedResponse,
    Cancelled,
    InputUnavailable,
}

/// Error recorded by a View Controller when an action fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaskError {
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Superseded by a newer request")]
    Cancelled,

    #[error("Input unavailable: {0}")]
    InputUnavailable(String),
}

impl TaskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::TransportFailure(_) => ErrorKind::TransportFailure,
            TaskError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            TaskError::Cancelled => ErrorKind::Cancelled,
            TaskError::InputUnavailable(_) => ErrorKind::InputUnavailable,
        }
    }

    /// Default text shown to the farmer when a screen has no specific message.
    pub fn user_message(&self) -> String {
        match self {
            TaskError::TransportFailure(_) => {
                "Could not reach the advisory service. Please try again.".to_string()
            }
            TaskError::MalformedResponse(_) => {
                "The advisory service returned an unreadable answer. Please try again.".to_string()
            }
            TaskError::Cancelled => "This request was replaced by a newer one.".to_string(),
            TaskError::InputUnavailable(detail) => format!("Input unavailable: {}", detail),
        }
    }
}

impl From<GatewayError> for TaskError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(msg) => TaskError::TransportFailure(msg),
            GatewayError::Malformed(msg) => TaskError::MalformedResponse(msg),
            GatewayError::Cancelled => TaskError::Cancelled,
        }
    }
}

impl From<CaptureError> for TaskError {
    fn from(err: CaptureError) -> Self {
        TaskError::InputUnavailable(err.to_string())
    }
}
