//! Pipeline orchestration
//!
//! The alert pipeline turns one feed fetch into a freshly rebuilt trigger
//! set: fetch → filter → group → register, run periodically and on demand.
//! A fetch failure aborts the run with no registry mutation — the previous
//! trigger set stays live until a later run completes grouping, at which
//! point registration always performs a full replace (an empty new set is a
//! valid outcome and still cancels stale triggers).
//!
//! The session pipeline in [`sessions`] is an independent consumer of the
//! same scheduling core with its own, disjoint registry.

pub mod sessions;

use chrono::{Duration, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::calendar::{filter_events, group_by_date_key, DateKey};
use crate::error::Result;
use crate::feed::FeedSource;
use crate::models::{Event, EventFilter};
use crate::notify::{format, DeliverySink};
use crate::scheduler::{TriggerRegistry, TriggerSpec};

pub use sessions::{SessionPipeline, SessionPipelineConfig};

// ============================================================================
// Run State
// ============================================================================

/// State of the alert pipeline, per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Filtering,
    Grouping,
    Registering,
}

impl RunState {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Filtering => "filtering",
            Self::Grouping => "grouping",
            Self::Registering => "registering",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary of one completed pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    /// Events returned by the feed
    pub fetched: usize,
    /// Events retained by the filter
    pub retained: usize,
    /// Distinct local calendar days with at least one event
    pub days: usize,
    /// Triggers actually installed
    pub installed: usize,
}

// ============================================================================
// Alert Pipeline
// ============================================================================

/// Configuration for the alert pipeline.
#[derive(Debug, Clone)]
pub struct AlertPipelineConfig {
    /// Timezone day boundaries and wall-clock fire times are evaluated in
    pub timezone: Tz,

    /// Exact-match criteria applied to fetched events
    pub filter: EventFilter,

    /// Local wall-clock time of the daily summary on each event day
    pub daily_time: NaiveTime,

    /// Lead subtracted from each event instant for its heads-up trigger
    pub pre_event_lead: Duration,

    /// Destination identifier handed to the delivery sink
    pub destination: String,
}

/// Orchestrates fetch → filter → group → trigger registration.
pub struct AlertPipeline {
    feed: Arc<dyn FeedSource>,
    sink: Arc<dyn DeliverySink>,
    registry: Arc<TriggerRegistry>,
    config: AlertPipelineConfig,
    state: RwLock<RunState>,
    // One in-flight run at a time; racing invocations queue here.
    run_lock: Mutex<()>,
    is_running: RwLock<bool>,
}

impl AlertPipeline {
    /// Create a new alert pipeline.
    pub fn new(
        feed: Arc<dyn FeedSource>,
        sink: Arc<dyn DeliverySink>,
        registry: Arc<TriggerRegistry>,
        config: AlertPipelineConfig,
    ) -> Self {
        Self {
            feed,
            sink,
            registry,
            config,
            state: RwLock::new(RunState::Idle),
            run_lock: Mutex::new(()),
            is_running: RwLock::new(false),
        }
    }

    /// Current pipeline state.
    pub async fn state(&self) -> RunState {
        *self.state.read().await
    }

    /// The alert trigger registry this pipeline owns.
    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    async fn set_state(&self, state: RunState) {
        *self.state.write().await = state;
        tracing::debug!(state = %state, "pipeline state changed");
    }

    /// Execute one full pipeline run.
    ///
    /// # Errors
    ///
    /// A feed failure is returned as-is; the trigger registry is left
    /// untouched in that case.
    pub async fn run_once(&self) -> Result<RunReport> {
        let _guard = self.run_lock.lock().await;

        self.set_state(RunState::Fetching).await;
        let events = match self.feed.fetch().await {
            Ok(events) => events,
            Err(e) => {
                // Abort with no registry mutation; the next periodic run
                // starts over from Idle.
                self.set_state(RunState::Idle).await;
                tracing::error!(error = %e, "feed fetch failed, aborting run");
                return Err(e.into());
            }
        };
        let fetched = events.len();

        self.set_state(RunState::Filtering).await;
        let retained = filter_events(events, &self.config.filter);

        self.set_state(RunState::Grouping).await;
        let groups = group_by_date_key(&retained, self.config.timezone);

        self.set_state(RunState::Registering).await;
        let specs = self.build_specs(&groups);
        let installed = self.registry.replace_specs(specs).await;

        self.set_state(RunState::Idle).await;

        let report = RunReport {
            fetched,
            retained: retained.len(),
            days: groups.len(),
            installed,
        };
        tracing::info!(
            fetched = report.fetched,
            retained = report.retained,
            days = report.days,
            installed = report.installed,
            "pipeline run complete"
        );
        Ok(report)
    }

    /// Build the full replacement set: one daily summary per local day plus
    /// one heads-up trigger per event. Both kinds share the registry and
    /// are swapped as a unit.
    fn build_specs(
        &self,
        groups: &std::collections::BTreeMap<DateKey, Vec<Event>>,
    ) -> Vec<TriggerSpec> {
        let tz = self.config.timezone;
        let mut specs = Vec::new();

        for (key, bucket) in groups {
            if let Some(slot) = self.daily_slot(*key) {
                let text = format::daily_summary(*key, bucket, tz);
                let sink = Arc::clone(&self.sink);
                let destination = self.config.destination.clone();
                specs.push(TriggerSpec::new(slot, Duration::zero(), move || async move {
                    sink.send(&text, &destination).await?;
                    Ok(())
                }));
            }

            for event in bucket {
                let text = format::pre_event(event, tz, self.config.pre_event_lead);
                let sink = Arc::clone(&self.sink);
                let destination = self.config.destination.clone();
                specs.push(TriggerSpec::new(
                    event.scheduled_at_utc(),
                    self.config.pre_event_lead,
                    move || async move {
                        sink.send(&text, &destination).await?;
                        Ok(())
                    },
                ));
            }
        }

        specs
    }

    /// Resolve the daily summary instant for one local date.
    fn daily_slot(&self, key: DateKey) -> Option<chrono::DateTime<Utc>> {
        let tz = self.config.timezone;
        let local = key.date().and_time(self.config.daily_time);
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => {
                tracing::warn!(
                    date = %key,
                    time = %self.config.daily_time,
                    "daily alert time does not exist on this date (DST gap), skipping"
                );
                None
            }
        }
    }

    /// Run the pipeline immediately, then on every interval tick until
    /// stopped.
    pub async fn start(&self, interval: std::time::Duration) {
        *self.is_running.write().await = true;
        tracing::info!(interval_secs = interval.as_secs(), "alert pipeline started");

        while *self.is_running.read().await {
            if let Err(e) = self.run_once().await {
                // Transient by taxonomy: the next tick retries naturally.
                tracing::warn!(error = %e, "pipeline run failed, waiting for next tick");
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.wait_for_stop() => break,
            }
        }

        tracing::info!("alert pipeline stopped");
    }

    /// Stop the periodic loop.
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
    }

    /// Check if the periodic loop is running.
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    async fn wait_for_stop(&self) {
        loop {
            if !*self.is_running.read().await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
