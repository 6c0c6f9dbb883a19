use axum::{http::StatusCode, response::IntoResponse, response::Json};
use serde::Serialize;

/// Failure talking to the remote wallet API.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Network(#[source] reqwest::Error),

    /// Non-2xx response whose body carried a `message` field.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Non-2xx response without a usable error body.
    #[error("HTTP error! Status: {status}")]
    Status { status: u16 },

    #[error("failed to decode wallet API response: {0}")]
    Decode(String),
}

impl FetchError {
    /// HTTP status reported by the upstream server, if it answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            FetchError::Api { status, .. } | FetchError::Status { status } => Some(*status),
            FetchError::Network(_) | FetchError::Decode(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.upstream_status(), Some(401) | Some(403))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned from dashboard handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Maps an upstream failure, keeping auth rejections visible to the browser.
    pub fn from_fetch(err: &FetchError, message: impl Into<String>) -> Self {
        if err.is_unauthorized() {
            Self::unauthorized(err.to_string())
        } else {
            Self::new(StatusCode::BAD_GATEWAY, message)
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        let message = err.to_string();
        Self::from_fetch(&err, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
