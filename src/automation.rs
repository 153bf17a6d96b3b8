//! Forwarding of confirmed matches to an automation webhook

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{RelayError, Result};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// A match the caller confirmed and wants handed to automation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutomationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Body posted to the webhook
#[derive(Debug, Clone, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    received_at: DateTime<Utc>,
}

/// Hands confirmed matches to an optional webhook
pub struct AutomationClient {
    http: Client,
    webhook_url: Option<String>,
}

impl AutomationClient {
    pub fn new(webhook_url: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| RelayError::configuration(e.to_string()))?;

        Ok(Self { http, webhook_url })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Validate and forward a confirmed match, returning the confirmation message
    pub async fn send(&self, request: &AutomationRequest) -> Result<String> {
        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RelayError::client_input("Missing required field: title."))?;

        info!(title, "Received match confirmation for automation");

        let Some(url) = &self.webhook_url else {
            debug!("No automation webhook configured, acknowledging only");
            return Ok(format!("Received \"{}\" for automation.", title));
        };

        let payload = WebhookPayload {
            title,
            image: request.image.as_deref(),
            link: request.link.as_deref(),
            source: request.source.as_deref(),
            received_at: Utc::now(),
        };

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RelayError::upstream(format!(
                "Webhook status {}: {}",
                status, error_text
            )));
        }

        info!(title, "Match forwarded to automation webhook");
        Ok(format!("Sent \"{}\" to automation.", title))
    }
}
