//! Wire models for the relay HTTP surface

use serde::{Deserialize, Serialize};

use crate::lookup::ResponseShape;

/// Multipart field carrying the image on `/identify`
pub const IDENTIFY_FIELD: &str = "image";

/// Multipart field carrying the image on `/identify-watch`
pub const WATCH_FIELD: &str = "watchImage";

/// Query parameters for `/identify`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentifyParams {
    #[serde(default)]
    pub shape: ResponseShape,
}

/// JSON body for `/identify`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentifyJsonRequest {
    /// Data URL or bare base64 payload
    #[serde(default)]
    pub image: Option<String>,
    /// Declared MIME type, used when `image` carries no usable prefix
    #[serde(default, alias = "mimeType")]
    pub mime_type: Option<String>,
}

/// Identified watch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchMatch {
    pub name: String,
}

/// Response for `/identify-watch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchResponse {
    pub success: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub matched: Option<WatchMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WatchResponse {
    pub fn found(name: impl Into<String>) -> Self {
        Self {
            success: true,
            matched: Some(WatchMatch { name: name.into() }),
            message: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            success: false,
            matched: None,
            message: Some(message.into()),
        }
    }
}

/// `{success, message}` body used by the watch and automation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub credential_configured: bool,
    pub automation_configured: bool,
}

/// API error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Standard error codes
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
}
