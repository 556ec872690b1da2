//! macrowatch - Economic calendar alert scheduler
//!
//! Turns an economic-calendar feed into timezone-correct, one-shot alert
//! triggers, and generates pattern-derived session alerts month by month.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//! - [`feed`] - Calendar feed client
//! - [`calendar`] - Event filtering and grouping by local date
//! - [`scheduler`] - Slot generation, timers, and the trigger registry
//! - [`pipeline`] - Event-alert and session-alert orchestration
//! - [`notify`] - Alert formatting and delivery sinks
//! - [`audit`] - Append-only slot-plan audit log
//!
//! # Example
//!
//! ```no_run
//! use macrowatch::config::Config;
//! use macrowatch::feed::HttpFeedClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!     let feed = HttpFeedClient::new(&config.feed.url, config.request_timeout())?;
//!     let _ = feed;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod calendar;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod scheduler;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::calendar::DateKey;
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::feed::{FeedSource, HttpFeedClient};
    pub use crate::models::{Event, EventFilter, Impact};
    pub use crate::notify::{DeliverySink, WebhookSink};
    pub use crate::pipeline::{AlertPipeline, SessionPipeline};
    pub use crate::scheduler::{SlotPlan, TriggerRegistry, TriggerSpec};
}

// Direct re-exports for convenience
pub use models::{Event, EventFilter, Impact};
