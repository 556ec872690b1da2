//! Calendar feed client
//!
//! Narrow collaborator contract: fetch the upcoming-events feed once, with a
//! bounded timeout, and hand back parsed [`Event`]s. Any transport or
//! protocol failure is an error the pipeline treats as fatal to the current
//! run; there is no retry here — recovery is the next periodic run.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::models::{Event, Impact};

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors raised while fetching or decoding the feed
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP transport failure (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the feed endpoint
    #[error("Feed responded with HTTP {status}")]
    Status { status: u16 },

    /// Response body could not be decoded as the expected feed shape
    #[error("Failed to decode feed body: {reason}")]
    Decode { reason: String },

    /// Invalid client configuration
    #[error("Invalid feed configuration: {0}")]
    InvalidConfig(String),
}

/// Source of calendar events.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current event feed.
    async fn fetch(&self) -> FeedResult<Vec<Event>>;
}

/// Raw record shape the feed serves.
///
/// Timestamps arrive as RFC 3339 strings carrying the source offset;
/// impact arrives as a free-form label.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    title: String,
    country: String,
    date: String,
    impact: String,
    #[serde(default)]
    forecast: Option<String>,
    #[serde(default)]
    previous: Option<String>,
}

/// HTTP feed client with a bounded request timeout.
pub struct HttpFeedClient {
    client: Client,
    url: String,
}

impl HttpFeedClient {
    /// Create a client for the given feed URL.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::InvalidConfig` for an unusable URL and
    /// `FeedError::Http` if the HTTP client cannot be created.
    pub fn new(url: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        let url = url.into();
        let parsed = Url::parse(&url)
            .map_err(|e| FeedError::InvalidConfig(format!("invalid feed URL {url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FeedError::InvalidConfig(format!(
                "feed URL must use http or https: {url}"
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    /// The feed URL this client fetches.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn convert(record: FeedRecord) -> Option<Event> {
        let scheduled_at = match DateTime::parse_from_rfc3339(&record.date) {
            Ok(dt) => dt,
            Err(e) => {
                tracing::warn!(
                    title = %record.title,
                    date = %record.date,
                    error = %e,
                    "skipping feed record with unparseable timestamp"
                );
                return None;
            }
        };

        let Some(impact) = Impact::parse(&record.impact) else {
            tracing::warn!(
                title = %record.title,
                impact = %record.impact,
                "skipping feed record with unknown impact label"
            );
            return None;
        };

        Some(Event {
            title: record.title,
            impact,
            country: record.country,
            scheduled_at,
            forecast: record.forecast.filter(|s| !s.is_empty()),
            previous: record.previous.filter(|s| !s.is_empty()),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedClient {
    async fn fetch(&self) -> FeedResult<Vec<Event>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        let records: Vec<FeedRecord> =
            response.json().await.map_err(|e| FeedError::Decode {
                reason: e.to_string(),
            })?;

        let total = records.len();
        let events: Vec<Event> = records.into_iter().filter_map(Self::convert).collect();

        tracing::info!(
            url = %self.url,
            total,
            parsed = events.len(),
            "feed fetched"
        );
        Ok(events)
    }
}
