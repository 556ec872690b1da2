//! Trigger registry with atomic full-set replacement
//!
//! A [`TriggerRegistry`] owns the currently active trigger handles for one
//! logical purpose (session alerts, event alerts). The underlying collection
//! is never exposed; every mutation runs inside a single mutual-exclusion
//! point so a periodic run racing a manual one cannot interleave its
//! stop/install sequence with another's.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use futures::FutureExt;
use std::future::Future;
use tokio::sync::Mutex;

use super::timer::{self, FireCallback, TriggerHandle};

// ============================================================================
// Trigger Spec
// ============================================================================

/// One trigger to install: a slot instant, the lead time to subtract from
/// it, and the callback to wrap.
pub struct TriggerSpec {
    /// The target instant the trigger announces.
    pub slot: DateTime<Utc>,

    /// Fixed duration subtracted from the slot to compute the fire instant.
    pub lead: Duration,

    callback: FireCallback,
}

impl TriggerSpec {
    /// Create a spec from a slot, lead time, and callback.
    pub fn new<F, Fut>(slot: DateTime<Utc>, lead: Duration, callback: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            slot,
            lead,
            callback: Box::new(move || callback().boxed()),
        }
    }

    /// The instant this trigger would fire at.
    pub fn fire_at(&self) -> DateTime<Utc> {
        self.slot - self.lead
    }
}

impl std::fmt::Debug for TriggerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerSpec")
            .field("slot", &self.slot)
            .field("lead", &self.lead)
            .finish()
    }
}

// ============================================================================
// Trigger Registry
// ============================================================================

/// The set of currently active triggers for one logical purpose.
pub struct TriggerRegistry {
    /// Registry name, for logs only
    name: String,

    /// Timezone trigger deadlines are evaluated in
    tz: Tz,

    /// Active handles; the mutex is the registry's single critical section
    handles: Mutex<Vec<TriggerHandle>>,
}

impl TriggerRegistry {
    /// Create an empty registry.
    pub fn new(name: impl Into<String>, tz: Tz) -> Self {
        Self {
            name: name.into(),
            tz,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// The timezone this registry schedules in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Atomically replace the whole trigger set from uniform slots.
    ///
    /// Every active handle is stopped and discarded, then one trigger per
    /// slot is installed at `slot - lead`, wrapping `factory(slot)`. Slots
    /// whose fire instant is not strictly in the future are skipped without
    /// error. Returns the number of triggers installed.
    pub async fn replace<F, Fut>(
        &self,
        slots: &[DateTime<Utc>],
        lead: Duration,
        factory: F,
    ) -> usize
    where
        F: Fn(DateTime<Utc>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let specs = slots
            .iter()
            .map(|&slot| {
                let fut = factory(slot);
                TriggerSpec {
                    slot,
                    lead,
                    callback: Box::new(move || fut.boxed()),
                }
            })
            .collect();
        self.replace_specs(specs).await
    }

    /// Atomically replace the whole trigger set from heterogeneous specs.
    ///
    /// Same contract as [`replace`](Self::replace); used when one registry
    /// carries several trigger kinds that must be swapped as a unit. An
    /// empty `specs` is valid and still cancels every prior trigger.
    pub async fn replace_specs(&self, specs: Vec<TriggerSpec>) -> usize {
        let mut handles = self.handles.lock().await;

        let stopped = handles.len();
        for handle in handles.drain(..) {
            handle.stop();
        }

        let now = Utc::now();
        let mut installed = 0;
        for spec in specs {
            let fire_at = spec.slot - spec.lead;
            if fire_at <= now {
                tracing::debug!(
                    registry = %self.name,
                    slot = %spec.slot,
                    fire_at = %fire_at,
                    "skipping trigger whose fire instant is not in the future"
                );
                continue;
            }
            handles.push(timer::schedule_boxed(fire_at, self.tz, spec.callback));
            installed += 1;
        }

        tracing::info!(
            registry = %self.name,
            stopped,
            installed,
            "trigger set replaced"
        );
        installed
    }

    /// Stop every trigger and clear the registry. Safe on an empty registry.
    pub async fn cancel_all(&self) {
        let mut handles = self.handles.lock().await;
        let stopped = handles.len();
        for handle in handles.drain(..) {
            handle.stop();
        }
        if stopped > 0 {
            tracing::info!(registry = %self.name, stopped, "all triggers cancelled");
        }
    }

    /// Current membership count.
    pub async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }

    /// Whether the registry holds no triggers.
    pub async fn is_empty(&self) -> bool {
        self.handles.lock().await.is_empty()
    }

    /// Fire instants of the current members, ascending. For status output.
    pub async fn fire_instants(&self) -> Vec<DateTime<Utc>> {
        let handles = self.handles.lock().await;
        let mut instants: Vec<_> = handles.iter().map(|h| h.fire_at()).collect();
        instants.sort_unstable();
        instants
    }
}

// ============================================================================
// Tests
// ============================================================================
