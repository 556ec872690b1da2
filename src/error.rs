//! Unified error handling for the macrowatch crate
//!
//! Consolidates the domain-specific errors into a single [`Error`] enum
//! usable across module boundaries, while the domain types stay available
//! where a narrower signature reads better.

use std::io;
use thiserror::Error;

pub use crate::feed::FeedError;
pub use crate::notify::ChannelError;
pub use crate::scheduler::error::SchedulerError;

/// Result alias for the unified error type
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (feed fetch, webhook transport)
    Network,
    /// Delivery rejections from the alert endpoint
    Delivery,
    /// Slot generation and trigger scheduling errors
    Scheduler,
    /// Configuration and validation errors
    Config,
    /// Storage and I/O errors
    Storage,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the macrowatch crate
#[derive(Error, Debug)]
pub enum Error {
    /// Feed fetch and decode errors
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Alert delivery errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] ChannelError),

    /// Slot generation and trigger errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Check if this error is recoverable (the next periodic run may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Feed(_) => true,
            Self::Delivery(ChannelError::InvalidConfig(_)) => false,
            Self::Delivery(_) => true,
            Self::Scheduler(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Http(_) => true,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Feed(FeedError::InvalidConfig(_)) => ErrorCategory::Config,
            Self::Feed(_) | Self::Http(_) => ErrorCategory::Network,
            Self::Delivery(ChannelError::InvalidConfig(_)) => ErrorCategory::Config,
            Self::Delivery(_) => ErrorCategory::Delivery,
            Self::Scheduler(SchedulerError::IoError { .. }) => ErrorCategory::Storage,
            Self::Scheduler(_) => ErrorCategory::Scheduler,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Other,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_errors_are_recoverable_network_errors() {
        let err = Error::from(FeedError::Status { status: 503 });
        assert!(err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_config_errors_are_fatal() {
        let err = Error::config("timezone 'Mars/Olympus' is not a known IANA zone");
        assert!(!err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_scheduler_validation_is_not_recoverable() {
        let err = Error::from(SchedulerError::EmptyPattern);
        assert!(!err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::Scheduler);
    }

    #[test]
    fn test_audit_io_maps_to_storage() {
        let err = Error::from(SchedulerError::io_error("open_audit_file", "permission denied"));
        assert!(err.is_recoverable());
        assert_eq!(err.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_other_with_source_preserves_context() {
        let io = io::Error::new(io::ErrorKind::Other, "disk full");
        let err = Error::with_source("flushing state", io);
        assert_eq!(err.to_string(), "flushing state");
    }
}
