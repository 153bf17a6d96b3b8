//! SerpAPI client for Google Lens reverse image search

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use super::provider::{ProviderError, VisualSearchProvider};
use crate::config::ProviderConfig;

/// SerpAPI provider
pub struct SerpApiClient {
    http: Client,
    endpoint: String,
    engine: String,
}

impl SerpApiClient {
    /// Create a new SerpAPI client
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            engine: config.engine.clone(),
        })
    }
}

#[async_trait]
impl VisualSearchProvider for SerpApiClient {
    async fn reverse_search(
        &self,
        image_url: &str,
        api_key: &SecretString,
    ) -> Result<Value, ProviderError> {
        debug!(
            "Calling SerpAPI: engine={}, payload_bytes={}",
            self.engine,
            image_url.len()
        );

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("engine", self.engine.as_str()),
                ("url", image_url),
                ("api_key", api_key.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                // reqwest errors embed the full URL, which carries the key
                let e = e.without_url();
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::UpstreamError(format!(
                "Status {}: {}",
                status, error_text
            )));
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()))?;

        if !document.is_object() {
            return Err(ProviderError::InvalidResponse(
                "expected a JSON object".to_string(),
            ));
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> SerpApiClient {
        let config = ProviderConfig {
            endpoint: format!("{}/search.json", server.url()),
            ..ProviderConfig::default()
        };
        SerpApiClient::new(&config).unwrap()
    }

    fn key() -> SecretString {
        SecretString::new("test-key".to_string())
    }

    #[tokio::test]
    async fn test_sends_engine_url_and_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("engine".into(), "google_lens".into()),
                Matcher::UrlEncoded("url".into(), "data:image/jpeg;base64,AAAA".into()),
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"visual_matches":[{"title":"X"}]}"#)
            .create_async()
            .await;

        let document = client_for(&server)
            .reverse_search("data:image/jpeg;base64,AAAA", &key())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(document, json!({ "visual_matches": [{ "title": "X" }] }));
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":"Invalid API key."}"#)
            .create_async()
            .await;

        let result = client_for(&server).reverse_search("data:,x", &key()).await;

        match result {
            Err(ProviderError::UpstreamError(msg)) => assert!(msg.contains("401")),
            other => panic!("Expected UpstreamError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let result = client_for(&server).reverse_search("data:,x", &key()).await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_non_object_document_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[1, 2, 3]")
            .create_async()
            .await;

        let result = client_for(&server).reverse_search("data:,x", &key()).await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_request_failure() {
        let config = ProviderConfig {
            endpoint: "http://127.0.0.1:1/search.json".to_string(),
            ..ProviderConfig::default()
        };
        let client = SerpApiClient::new(&config).unwrap();

        let result = client.reverse_search("data:,x", &key()).await;
        match result {
            Err(ProviderError::RequestFailed(msg)) => assert!(!msg.contains("test-key")),
            other => panic!("Expected RequestFailed, got {:?}", other),
        }
    }
}
