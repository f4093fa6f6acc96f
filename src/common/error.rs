// Error handling types for the API client

use serde_json::Value;
use thiserror::Error;

/// Error returned by every call made through `ApiClient`
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<Value>,
    },

    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiClientError {
    /// HTTP status of the failure, `0` when no response was received
    pub fn status(&self) -> u16 {
        match self {
            ApiClientError::Status { status, .. } => *status,
            ApiClientError::Network(_) | ApiClientError::Decode(_) => 0,
        }
    }

    /// Machine-readable error code, if the backend (or transport) supplied one
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiClientError::Status { code, .. } => code.as_deref(),
            ApiClientError::Network(_) => Some("NETWORK_ERROR"),
            ApiClientError::Decode(_) => Some("DECODE_ERROR"),
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiClientError::Status { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == 401
    }

    /// Whether a GET that failed this way may be attempted again.
    /// Authorization failures never are.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.status(), 401 | 403)
    }
}

impl From<reqwest::Error> for ApiClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiClientError::Decode(err.to_string())
        } else {
            ApiClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiClientError {
    fn from(err: serde_json::Error) -> Self {
        ApiClientError::Decode(err.to_string())
    }
}
