//! The image lookup relay: validate, encode, call the provider, shape

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use super::image::InboundImage;
use super::models::{IdentifyResult, ResponseShape};
use super::provider::VisualSearchProvider;
use crate::config::API_KEY_ENV_VARS;
use crate::error::{RelayError, Result};
use crate::metrics::METRICS;

/// Relays one image per call to the visual-search provider
pub struct ImageLookupRelay {
    provider: Arc<dyn VisualSearchProvider>,
    api_key: Option<SecretString>,
    max_results: usize,
}

impl ImageLookupRelay {
    pub fn new(
        provider: Arc<dyn VisualSearchProvider>,
        api_key: Option<SecretString>,
        max_results: usize,
    ) -> Self {
        let api_key = api_key.filter(|key| !key.expose_secret().trim().is_empty());
        Self {
            provider,
            api_key,
            max_results,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Identify an image with the default match limit
    pub async fn identify(
        &self,
        image: Option<InboundImage>,
        shape: ResponseShape,
    ) -> Result<IdentifyResult> {
        self.identify_with_limit(Ok(image), shape, self.max_results)
            .await
    }

    /// Identify an image, keeping at most `limit` matches in the projected shape
    ///
    /// `payload` is the outcome of reading the request body. The credential is
    /// checked before it is inspected, and no failure here reaches the provider.
    pub async fn identify_with_limit(
        &self,
        payload: Result<Option<InboundImage>>,
        shape: ResponseShape,
        limit: usize,
    ) -> Result<IdentifyResult> {
        let lookup_id = Uuid::new_v4();

        let api_key = self.api_key.as_ref().ok_or_else(|| {
            RelayError::configuration(format!(
                "Provider API key is not set; set {} or {}.",
                API_KEY_ENV_VARS[0], API_KEY_ENV_VARS[1]
            ))
        })?;

        let image = payload?
            .filter(|image| !image.is_empty())
            .ok_or_else(|| RelayError::client_input("No image provided."))?;

        info!(
            %lookup_id,
            payload_bytes = image.len(),
            shape = shape.as_str(),
            "Received an image for identification"
        );

        let data_url = image.to_data_url()?;

        info!(%lookup_id, "Sending image to provider for reverse image search");
        let start = Instant::now();

        let document = self
            .provider
            .reverse_search(&data_url, api_key)
            .await
            .map_err(|e| {
                METRICS.record_provider_error();
                RelayError::upstream(e.to_string())
            })?;

        let result = IdentifyResult::from_document(document, shape, limit);

        info!(
            %lookup_id,
            matches = result.match_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Provider responded"
        );

        Ok(result)
    }
}
