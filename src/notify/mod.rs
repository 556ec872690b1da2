//! Delivery of formatted alert messages
//!
//! The pipeline never talks to a chat service directly; it hands formatted
//! text plus a destination identifier to a [`DeliverySink`]. A failed send
//! is reported back, caught at the trigger boundary, and never retried —
//! a missed delivery is lost and logged.

pub mod format;
pub mod webhook;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use webhook::{WebhookConfig, WebhookSink};

/// Result type for delivery operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors that can occur while delivering a message
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint rejected the message
    #[error("Delivery rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Invalid sink configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of one delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryStatus {
    /// Whether the message was successfully delivered
    pub success: bool,
    /// Sink that handled the attempt
    pub sink: String,
    /// Destination the message was addressed to
    pub destination: String,
    /// Timestamp of the attempt
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl DeliveryStatus {
    /// Create a successful delivery status
    pub fn success(sink: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            success: true,
            sink: sink.into(),
            destination: destination.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a failed delivery status
    pub fn failure(sink: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            success: false,
            sink: sink.into(),
            destination: destination.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "SUCCESS" } else { "FAILED" };
        write!(f, "[{status}] {} -> {}", self.sink, self.destination)
    }
}

/// Trait for delivery sinks
///
/// Implement this trait to route formatted alerts to a chat service.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Get the sink name
    fn name(&self) -> &str;

    /// Deliver formatted text to a destination identifier
    async fn send(&self, text: &str, destination: &str) -> ChannelResult<DeliveryStatus>;
}
