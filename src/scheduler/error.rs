//! Error types for the scheduler module

use std::fmt;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug)]
pub enum SchedulerError {
    /// Offset pattern is empty
    EmptyPattern,

    /// Offset pattern contains a non-positive hour value
    InvalidOffset {
        hours: i64,
    },

    /// Invalid month value (must be 1-12)
    InvalidMonth {
        month: u32,
    },

    /// Invalid timezone name
    InvalidTimezone {
        tz: String,
    },

    /// Invalid wall-clock alert time
    InvalidAlertTime {
        value: String,
    },

    /// Serialization/deserialization error
    SerializationError {
        reason: String,
    },

    /// IO error
    IoError {
        operation: String,
        reason: String,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPattern => {
                write!(f, "Offset pattern must contain at least one entry")
            }
            Self::InvalidOffset { hours } => {
                write!(f, "Invalid pattern offset '{}h'. Must be positive", hours)
            }
            Self::InvalidMonth { month } => {
                write!(f, "Invalid month '{}'. Must be 1-12", month)
            }
            Self::InvalidTimezone { tz } => {
                write!(f, "Invalid timezone: {}", tz)
            }
            Self::InvalidAlertTime { value } => {
                write!(f, "Invalid alert time '{}'. Expected HH:MM", value)
            }
            Self::SerializationError { reason } => {
                write!(f, "Serialization error: {}", reason)
            }
            Self::IoError { operation, reason } => {
                write!(f, "IO error during '{}': {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<serde_json::Error> for SchedulerError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SchedulerError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            operation: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl SchedulerError {
    /// Create an invalid offset error
    pub fn invalid_offset(hours: i64) -> Self {
        Self::InvalidOffset { hours }
    }

    /// Create an invalid month error
    pub fn invalid_month(month: u32) -> Self {
        Self::InvalidMonth { month }
    }

    /// Create an invalid timezone error
    pub fn invalid_timezone(tz: impl Into<String>) -> Self {
        Self::InvalidTimezone { tz: tz.into() }
    }

    /// Create an invalid alert time error
    pub fn invalid_alert_time(value: impl Into<String>) -> Self {
        Self::InvalidAlertTime {
            value: value.into(),
        }
    }

    /// Create an IO error with context
    pub fn io_error(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IoError {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::IoError { .. })
    }
}
