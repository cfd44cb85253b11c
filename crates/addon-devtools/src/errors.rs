//! Dev tools error types.
//!
//! Every failure in a bootstrap run is one of four kinds. None of them are
//! retried; they propagate to the top-level run, which reports the message and
//! exits with the kind's exit code. The handle server maps them to HTTP status
//! codes via the `IntoResponse` impl.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Dev tools error type.
///
/// Maps to:
/// - Configuration: exit code 2, 500 Internal Server Error
/// - Auth: exit code 3, 401 Unauthorized
/// - Transport: exit code 4, 502 Bad Gateway
/// - Dependency: exit code 5, 503 Service Unavailable
#[derive(Debug, Error)]
pub enum DevToolsError {
    /// Required configuration is missing or invalid. Raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The tenant credential exchange was rejected.
    #[error("Authentication rejected: {0}")]
    Auth(String),

    /// A network exchange failed or returned an unusable response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A resource a later call depends on could not be established.
    #[error("Dependency error: {0}")]
    Dependency(String),
}

impl DevToolsError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DevToolsError::Configuration(_) => "CONFIGURATION_ERROR",
            DevToolsError::Auth(_) => "AUTH_ERROR",
            DevToolsError::Transport(_) => "TRANSPORT_ERROR",
            DevToolsError::Dependency(_) => "DEPENDENCY_ERROR",
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            DevToolsError::Configuration(_) => 2,
            DevToolsError::Auth(_) => 3,
            DevToolsError::Transport(_) => 4,
            DevToolsError::Dependency(_) => 5,
        }
    }

    /// HTTP status code used by the handle server.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DevToolsError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DevToolsError::Auth(_) => StatusCode::UNAUTHORIZED,
            DevToolsError::Transport(_) => StatusCode::BAD_GATEWAY,
            DevToolsError::Dependency(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<StoreError> for DevToolsError {
    fn from(err: StoreError) -> Self {
        DevToolsError::Configuration(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for DevToolsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.kind().to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}
