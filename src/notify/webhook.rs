//! Webhook delivery sink
//!
//! Sends formatted alerts as JSON payloads via HTTP POST. One attempt per
//! send: retry/backoff is deliberately absent, the caller's trigger
//! boundary logs failures and moves on.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChannelError, ChannelResult, DeliverySink, DeliveryStatus};

/// Webhook sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL endpoint
    pub url: String,
    /// Optional authentication token (sent as Bearer token)
    pub auth_token: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    10
}

impl WebhookConfig {
    /// Create a new webhook configuration
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            timeout_secs: default_timeout(),
        }
    }

    /// Set authentication token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Webhook URL cannot be empty".to_string());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("Webhook URL must start with http:// or https://".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Webhook delivery sink
///
/// # Payload Format
///
/// ```json
/// {
///   "destination": "alerts-room",
///   "text": "High impact events for 2025-06-06 ...",
///   "sent_at": "2025-06-06T08:00:00Z"
/// }
/// ```
pub struct WebhookSink {
    config: WebhookConfig,
    client: Client,
}

impl WebhookSink {
    /// Create a new webhook sink
    pub fn new(config: WebhookConfig) -> ChannelResult<Self> {
        config.validate().map_err(ChannelError::InvalidConfig)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Create a simple webhook sink with just a URL
    pub fn from_url(url: impl Into<String>) -> ChannelResult<Self> {
        Self::new(WebhookConfig::new(url))
    }

    /// Get the webhook URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn build_payload(&self, text: &str, destination: &str) -> serde_json::Value {
        serde_json::json!({
            "destination": destination,
            "text": text,
            "sent_at": chrono::Utc::now().to_rfc3339(),
        })
    }
}

#[async_trait]
impl DeliverySink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, text: &str, destination: &str) -> ChannelResult<DeliveryStatus> {
        let payload = self.build_payload(text, destination);

        let mut request = self.client.post(&self.config.url);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.json(&payload).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::info!(
                url = %self.config.url,
                destination,
                "alert delivered"
            );
            Ok(DeliveryStatus::success("webhook", destination))
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            tracing::error!(
                url = %self.config.url,
                destination,
                status = status.as_u16(),
                "alert delivery rejected"
            );
            Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
