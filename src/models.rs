// Core data structures for macrowatch

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// A single calendar event from the external feed.
///
/// Events are immutable once fetched; the pipeline owns them for the
/// duration of one run and rebuilds everything from scratch on the next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub impact: Impact,
    /// Country / market code the event belongs to (e.g., "USD", "EUR").
    pub country: String,
    /// Absolute instant the event is scheduled for, with the source offset.
    pub scheduled_at: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

impl Event {
    /// Create an event with only the fields every feed record carries.
    pub fn new(
        title: impl Into<String>,
        impact: Impact,
        country: impl Into<String>,
        scheduled_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            title: title.into(),
            impact,
            country: country.into(),
            scheduled_at,
            forecast: None,
            previous: None,
        }
    }

    /// Scheduled instant normalized to UTC.
    pub fn scheduled_at_utc(&self) -> DateTime<Utc> {
        self.scheduled_at.with_timezone(&Utc)
    }
}

/// Expected market impact of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
    /// Bank holidays and other non-release entries some feeds carry.
    Holiday,
}

impl Impact {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Holiday => "holiday",
        }
    }

    /// Create from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "holiday" | "non-economic" => Some(Self::Holiday),
            _ => None,
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exact-match filter criteria applied to fetched events.
///
/// An empty criterion list matches everything for that field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    /// Impacts to retain (empty = all).
    #[serde(default)]
    pub impacts: Vec<Impact>,

    /// Country / market codes to retain (empty = all).
    #[serde(default)]
    pub countries: Vec<String>,
}

impl EventFilter {
    /// Check whether an event passes every configured criterion.
    pub fn matches(&self, event: &Event) -> bool {
        let impact_ok = self.impacts.is_empty() || self.impacts.contains(&event.impact);
        let country_ok =
            self.countries.is_empty() || self.countries.iter().any(|c| c == &event.country);
        impact_ok && country_ok
    }
}
