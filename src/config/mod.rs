//! Configuration management for macrowatch
//!
//! Loads configuration from a TOML file or environment variables and
//! validates it up front. Anything that would silently corrupt scheduling
//! later — an unknown timezone, a bad anchor timestamp, a non-positive
//! pattern offset — is a fatal validation error at startup.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{EventFilter, Impact};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Feed client configuration
    pub feed: FeedConfig,

    /// Event-alert pipeline configuration
    pub calendar: CalendarConfig,

    /// Session-alert pipeline configuration
    pub sessions: SessionsConfig,

    /// Pipeline scheduling configuration
    pub pipeline: PipelineConfig,

    /// Webhook delivery configuration
    pub delivery: DeliveryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Feed client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed endpoint URL
    pub url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Event-alert pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// IANA timezone name day boundaries and fire times are evaluated in
    pub timezone: String,

    /// Local wall-clock time of the daily summary, "HH:MM"
    pub daily_alert_time: String,

    /// Minutes before each event its heads-up alert fires
    pub pre_event_lead_minutes: i64,

    /// Impact labels to retain (empty = all)
    pub impacts: Vec<String>,

    /// Country / market codes to retain (empty = all)
    pub countries: Vec<String>,

    /// Destination identifier for event alerts
    pub destination: String,
}

/// Session-alert pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Generation starting instant, RFC 3339
    pub anchor: String,

    /// Cycling hour offsets advanced from the anchor
    pub pattern_hours: Vec<i64>,

    /// Minutes before each slot its alert fires
    pub lead_minutes: i64,

    /// Destination identifier for session alerts
    pub destination: String,

    /// Directory slot-plan audit listings are written to
    pub audit_dir: PathBuf,
}

/// Pipeline scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minutes between periodic feed refreshes
    pub interval_minutes: u64,
}

/// Webhook delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Webhook URL alerts are POSTed to
    pub webhook_url: String,

    /// Optional bearer token
    pub auth_token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("MACROWATCH_FEED_URL")
            .unwrap_or_else(|_| String::from("https://nfs.faireconomy.media/ff_calendar_thisweek.json"));

        let request_timeout_secs = std::env::var("MACROWATCH_FEED_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let timezone =
            std::env::var("MACROWATCH_TIMEZONE").unwrap_or_else(|_| String::from("America/New_York"));

        let daily_alert_time =
            std::env::var("MACROWATCH_DAILY_ALERT_TIME").unwrap_or_else(|_| String::from("07:30"));

        let pre_event_lead_minutes = std::env::var("MACROWATCH_PRE_EVENT_LEAD")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(15);

        let anchor = std::env::var("MACROWATCH_SESSION_ANCHOR")
            .unwrap_or_else(|_| String::from("2025-01-05T22:00:00Z"));

        let pattern_hours = std::env::var("MACROWATCH_SESSION_PATTERN")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|p| p.trim().parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_else(|| vec![24]);

        let session_lead_minutes = std::env::var("MACROWATCH_SESSION_LEAD")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(10);

        let audit_dir = std::env::var("MACROWATCH_AUDIT_DIR")
            .unwrap_or_else(|_| String::from("data/audit"))
            .into();

        let interval_minutes = std::env::var("MACROWATCH_REFRESH_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let webhook_url = std::env::var("MACROWATCH_WEBHOOK_URL")
            .unwrap_or_else(|_| String::from("http://localhost:8080/alerts"));

        let auth_token = std::env::var("MACROWATCH_WEBHOOK_TOKEN").ok();

        let log_level =
            std::env::var("MACROWATCH_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("MACROWATCH_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            feed: FeedConfig {
                url,
                request_timeout_secs,
            },
            calendar: CalendarConfig {
                timezone,
                daily_alert_time,
                pre_event_lead_minutes,
                impacts: vec![String::from("high")],
                countries: Vec::new(),
                destination: String::from("economic-alerts"),
            },
            sessions: SessionsConfig {
                anchor,
                pattern_hours,
                lead_minutes: session_lead_minutes,
                destination: String::from("session-alerts"),
                audit_dir,
            },
            pipeline: PipelineConfig { interval_minutes },
            delivery: DeliveryConfig {
                webhook_url,
                auth_token,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Validate configuration values
    ///
    /// Every value used to compute a fire instant must parse here, before
    /// any trigger is installed.
    pub fn validate(&self) -> Result<()> {
        if self.feed.url.is_empty() {
            anyhow::bail!("feed.url must not be empty");
        }

        if self.feed.request_timeout_secs == 0 {
            anyhow::bail!("feed.request_timeout_secs must be greater than 0");
        }

        self.timezone()?;
        self.daily_alert_time()?;
        self.anchor()?;

        if self.calendar.pre_event_lead_minutes < 0 {
            anyhow::bail!("calendar.pre_event_lead_minutes must not be negative");
        }

        for impact in &self.calendar.impacts {
            if Impact::parse(impact).is_none() {
                anyhow::bail!("calendar.impacts contains unknown label: {impact}");
            }
        }

        if self.sessions.pattern_hours.is_empty() {
            anyhow::bail!("sessions.pattern_hours must not be empty");
        }
        if self.sessions.pattern_hours.iter().any(|&h| h <= 0) {
            anyhow::bail!("sessions.pattern_hours offsets must all be positive");
        }

        if self.sessions.lead_minutes < 0 {
            anyhow::bail!("sessions.lead_minutes must not be negative");
        }

        if self.pipeline.interval_minutes == 0 {
            anyhow::bail!("pipeline.interval_minutes must be greater than 0");
        }

        if !self.delivery.webhook_url.starts_with("http://")
            && !self.delivery.webhook_url.starts_with("https://")
        {
            anyhow::bail!("delivery.webhook_url must start with http:// or https://");
        }

        Ok(())
    }

    /// Parsed IANA timezone
    pub fn timezone(&self) -> Result<Tz> {
        self.calendar
            .timezone
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("unknown timezone: {}", self.calendar.timezone))
    }

    /// Parsed daily alert wall-clock time
    pub fn daily_alert_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.calendar.daily_alert_time, "%H:%M").with_context(|| {
            format!(
                "calendar.daily_alert_time must be HH:MM, got: {}",
                self.calendar.daily_alert_time
            )
        })
    }

    /// Parsed session anchor instant
    pub fn anchor(&self) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.sessions.anchor)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| {
                format!(
                    "sessions.anchor must be RFC 3339, got: {}",
                    self.sessions.anchor
                )
            })
    }

    /// Pre-event lead as a chrono Duration
    #[must_use]
    pub fn pre_event_lead(&self) -> Duration {
        Duration::minutes(self.calendar.pre_event_lead_minutes)
    }

    /// Session alert lead as a chrono Duration
    #[must_use]
    pub fn session_lead(&self) -> Duration {
        Duration::minutes(self.sessions.lead_minutes)
    }

    /// Feed request timeout
    #[must_use]
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.feed.request_timeout_secs)
    }

    /// Pipeline refresh interval
    #[must_use]
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.pipeline.interval_minutes * 60)
    }

    /// Event filter built from the configured criteria
    ///
    /// Labels were validated in [`validate`](Self::validate); unknown ones
    /// here are silently dropped.
    #[must_use]
    pub fn event_filter(&self) -> EventFilter {
        EventFilter {
            impacts: self
                .calendar
                .impacts
                .iter()
                .filter_map(|s| Impact::parse(s))
                .collect(),
            countries: self.calendar.countries.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig {
                url: String::from("https://nfs.faireconomy.media/ff_calendar_thisweek.json"),
                request_timeout_secs: 30,
            },
            calendar: CalendarConfig {
                timezone: String::from("America/New_York"),
                daily_alert_time: String::from("07:30"),
                pre_event_lead_minutes: 15,
                impacts: vec![String::from("high")],
                countries: Vec::new(),
                destination: String::from("economic-alerts"),
            },
            sessions: SessionsConfig {
                anchor: String::from("2025-01-05T22:00:00Z"),
                pattern_hours: vec![24],
                lead_minutes: 10,
                destination: String::from("session-alerts"),
                audit_dir: PathBuf::from("data/audit"),
            },
            pipeline: PipelineConfig {
                interval_minutes: 60,
            },
            delivery: DeliveryConfig {
                webhook_url: String::from("http://localhost:8080/alerts"),
                auth_token: None,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_timezone_is_fatal() {
        let mut config = Config::default();
        config.calendar.timezone = String::from("Mars/Olympus");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_daily_alert_time_is_fatal() {
        let mut config = Config::default();
        config.calendar.daily_alert_time = String::from("7:30am");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_anchor_is_fatal() {
        let mut config = Config::default();
        config.sessions.anchor = String::from("next sunday");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_pattern_offset_is_fatal() {
        let mut config = Config::default();
        config.sessions.pattern_hours = vec![24, 0];
        assert!(config.validate().is_err());

        config.sessions.pattern_hours = Vec::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_impact_label_is_fatal() {
        let mut config = Config::default();
        config.calendar.impacts = vec![String::from("mega")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_typed_accessors() {
        let config = Config::default();

        assert_eq!(config.timezone().unwrap(), chrono_tz::America::New_York);
        assert_eq!(
            config.daily_alert_time().unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert_eq!(config.pre_event_lead(), Duration::minutes(15));
        assert_eq!(config.refresh_interval(), std::time::Duration::from_secs(3600));

        let filter = config.event_filter();
        assert_eq!(filter.impacts, vec![Impact::High]);
        assert!(filter.countries.is_empty());
    }
}
