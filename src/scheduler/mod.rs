//! Timezone-correct one-shot trigger scheduling
//!
//! This module is the scheduling core: it converts a repeating hour-offset
//! pattern into a month's worth of future instants and keeps sets of
//! fire-once triggers alive as atomically-replaceable collections.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 TriggerRegistry                  │
//! │   replace(slots) / replace_specs / cancel_all    │
//! │        (one critical section per registry)       │
//! └──────────────────────┬──────────────────────────┘
//!                        │ owns
//!            ┌───────────▼───────────┐
//!            │     TriggerHandle      │   fire-once, stop()
//!            │  (timer::schedule ...) │   inert after firing
//!            └───────────▲───────────┘
//!                        │ instants from
//!            ┌───────────┴───────────┐
//!            │    slots::generate     │   pattern × target month × tz
//!            └────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`slots`] - Pattern-based slot generation against calendar-month
//!   boundaries in a named timezone
//! - [`timer`] - The one-shot timer primitive and [`TriggerHandle`]
//! - [`registry`] - Atomic full-set replacement and cancellation
//! - [`error`] - Scheduler error types

pub mod error;
pub mod registry;
pub mod slots;
pub mod timer;

// Re-export main types
pub use error::{SchedulerError, SchedulerResult};
pub use registry::{TriggerRegistry, TriggerSpec};
pub use slots::{generate, SlotPlan, MAX_CYCLES};
pub use timer::{schedule, TriggerHandle};
