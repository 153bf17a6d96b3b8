//! Error types for the image lookup relay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::models::{error_codes, ApiError};

/// Result alias used across the relay
pub type Result<T> = std::result::Result<T, RelayError>;

/// Relay error kinds
///
/// Every variant is converted into an HTTP response at the handler boundary;
/// none of them escape a request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The caller sent no image or omitted a required field
    #[error("{0}")]
    ClientInput(String),

    /// A required deployment setting (the provider credential) is missing
    #[error("{0}")]
    Configuration(String),

    /// The provider or webhook call failed or returned an unusable document
    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

impl RelayError {
    pub fn client_input(message: impl Into<String>) -> Self {
        Self::ClientInput(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ClientInput(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ClientInput(_) => error_codes::VALIDATION_ERROR,
            Self::Configuration(_) => error_codes::CONFIGURATION_ERROR,
            Self::Upstream(_) => error_codes::UPSTREAM_ERROR,
        }
    }

    /// Label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClientInput(_) => "client_error",
            Self::Configuration(_) => "configuration_error",
            Self::Upstream(_) => "upstream_error",
        }
    }

    /// Emit a log line at the severity matching this error kind
    pub fn log(&self, context: &str) {
        match self {
            Self::ClientInput(msg) => tracing::warn!("{}: {}", context, msg),
            Self::Configuration(msg) => tracing::error!("{}: {}", context, msg),
            Self::Upstream(msg) => tracing::error!("{}: {}", context, msg),
        }
    }

    /// Body with `{error, code, details?}`
    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::ClientInput(msg) => ApiError::new(self.code(), msg.clone()),
            Self::Configuration(msg) => {
                ApiError::new(self.code(), "Server is missing required configuration.")
                    .with_details(msg.clone())
            }
            Self::Upstream(msg) => {
                ApiError::new(self.code(), "Failed to perform image search.").with_details(msg.clone())
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_api_error())).into_response()
    }
}
