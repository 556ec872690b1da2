//! One-shot trigger scheduling
//!
//! This module owns the timer primitive the rest of the crate schedules
//! against: `schedule(instant, timezone, callback)` returns a live
//! [`TriggerHandle`] that fires exactly once and can be stopped until then.
//!
//! The fire deadline is resolved from the wall-clock components of the
//! instant *as observed in the target timezone* and converted back to an
//! absolute deadline. That encoding stays internal to this module; callers
//! reason in absolute instants only.

use chrono::{DateTime, Datelike, LocalResult, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Boxed fire callback; errors are caught and logged at the fire boundary.
pub type FireCallback = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// A live, fire-once scheduled callback bound to one instant and timezone.
///
/// Owned exclusively by the registry that created it. After firing the
/// handle is inert: `stop()` becomes a no-op.
pub struct TriggerHandle {
    fire_at: DateTime<Utc>,
    fired: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TriggerHandle {
    /// The absolute instant this trigger fires at.
    pub fn fire_at(&self) -> DateTime<Utc> {
        self.fire_at
    }

    /// Whether the trigger has already fired.
    ///
    /// The flag flips as firing begins, so a `stop()` racing an in-flight
    /// delivery does not cancel it.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Stop the trigger. No-op if it has already fired.
    pub fn stop(&self) {
        if !self.has_fired() {
            self.task.abort();
        }
    }
}

impl std::fmt::Debug for TriggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerHandle")
            .field("fire_at", &self.fire_at)
            .field("fired", &self.has_fired())
            .finish()
    }
}

/// Schedule a one-shot callback at `fire_at`, evaluated in `tz`.
pub fn schedule<F, Fut>(fire_at: DateTime<Utc>, tz: Tz, callback: F) -> TriggerHandle
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    schedule_boxed(fire_at, tz, Box::new(move || callback().boxed()))
}

pub(crate) fn schedule_boxed(fire_at: DateTime<Utc>, tz: Tz, callback: FireCallback) -> TriggerHandle {
    let deadline = resolve_wall_clock(fire_at, tz);
    let fired = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&fired);
    let task = tokio::spawn(async move {
        let remaining = (deadline - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        tokio::time::sleep(remaining).await;

        flag.store(true, Ordering::SeqCst);
        if let Err(e) = callback().await {
            // Delivery failures are isolated here: siblings and the owning
            // registry never observe them.
            tracing::error!(error = %e, fire_at = %deadline, "trigger delivery failed");
        }
    });

    TriggerHandle {
        fire_at: deadline,
        fired,
        task,
    }
}

/// Resolve the fire deadline from the instant's wall-clock components in
/// `tz`. The minute/hour/day/month handed to the zone-aware constructor are
/// the ones a clock on the wall in `tz` would show, which is what keeps
/// alerts at the right local time independent of the host zone.
fn resolve_wall_clock(fire_at: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local = fire_at.with_timezone(&tz);
    match tz.with_ymd_and_hms(
        local.year(),
        local.month(),
        local.day(),
        local.hour(),
        local.minute(),
        local.second(),
    ) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        // Ambiguous local time during a DST fold: take the earlier instant.
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Nonexistent local time in a DST gap: keep the original instant.
        LocalResult::None => fire_at,
    }
}

// ============================================================================
// Tests
// ============================================================================
