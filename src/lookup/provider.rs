//! Visual-search provider seam

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;

/// Provider call failures
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Reverse-image-search provider
///
/// One call per lookup; implementations return the provider's JSON document
/// as received.
#[async_trait]
pub trait VisualSearchProvider: Send + Sync {
    /// Search for images visually similar to `image_url` (a data URL or public URL)
    async fn reverse_search(
        &self,
        image_url: &str,
        api_key: &SecretString,
    ) -> Result<Value, ProviderError>;
}
