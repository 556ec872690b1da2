//! Monthly session-alert pipeline
//!
//! Independent of the event-alert pipeline: it fetches nothing. Once per
//! month (and on demand) it regenerates the pattern-derived slot plan for
//! the current month, appends the listing to the audit log, and atomically
//! replaces its own trigger registry. An audit write failure is logged and
//! does not block scheduling.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::audit::AuditLog;
use crate::error::Result;
use crate::notify::{format, DeliverySink};
use crate::scheduler::{slots, TriggerRegistry};

/// Configuration for the session pipeline.
#[derive(Debug, Clone)]
pub struct SessionPipelineConfig {
    /// Fixed generation starting instant
    pub anchor: DateTime<Utc>,

    /// Cycling hour offsets advanced from the anchor
    pub pattern: Vec<i64>,

    /// Timezone month membership and fire times are evaluated in
    pub timezone: Tz,

    /// Lead subtracted from each slot for its alert
    pub lead: Duration,

    /// Destination identifier handed to the delivery sink
    pub destination: String,
}

/// Regenerates and schedules session alerts month by month.
pub struct SessionPipeline {
    sink: Arc<dyn DeliverySink>,
    registry: Arc<TriggerRegistry>,
    audit: AuditLog,
    config: SessionPipelineConfig,
    is_running: RwLock<bool>,
}

impl SessionPipeline {
    /// Create a new session pipeline.
    pub fn new(
        sink: Arc<dyn DeliverySink>,
        registry: Arc<TriggerRegistry>,
        audit: AuditLog,
        config: SessionPipelineConfig,
    ) -> Self {
        Self {
            sink,
            registry,
            audit,
            config,
            is_running: RwLock::new(false),
        }
    }

    /// The session trigger registry this pipeline owns.
    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// Regenerate and reschedule for the month containing now.
    pub async fn refresh_current_month(&self) -> Result<usize> {
        let local = Utc::now().with_timezone(&self.config.timezone);
        self.refresh_month(local.year(), local.month()).await
    }

    /// Regenerate the slot plan for one target month and atomically replace
    /// the session trigger set with it. Returns the number of triggers
    /// installed (past slots are skipped).
    pub async fn refresh_month(&self, year: i32, month: u32) -> Result<usize> {
        let plan = slots::generate(
            self.config.anchor,
            &self.config.pattern,
            year,
            month,
            self.config.timezone,
        )?;

        if let Err(e) = self.audit.append_plan(&plan, self.config.timezone).await {
            // The plan is still valid; scheduling proceeds without the record.
            tracing::warn!(year, month, error = %e, "audit write failed");
        }

        let tz = self.config.timezone;
        let lead = self.config.lead;
        let sink = Arc::clone(&self.sink);
        let destination = self.config.destination.clone();
        let installed = self
            .registry
            .replace(&plan.slots, lead, move |slot| {
                let sink = Arc::clone(&sink);
                let destination = destination.clone();
                let text = format::session_alert(slot, tz, lead);
                async move {
                    sink.send(&text, &destination).await?;
                    Ok(())
                }
            })
            .await;

        tracing::info!(
            year,
            month,
            slots = plan.len(),
            installed,
            truncated = plan.truncated,
            "session month refreshed"
        );
        Ok(installed)
    }

    /// Refresh the current month now, then once at the start of every
    /// following month, until stopped.
    pub async fn start(&self) {
        *self.is_running.write().await = true;
        tracing::info!(tz = %self.config.timezone, "session pipeline started");

        while *self.is_running.read().await {
            if let Err(e) = self.refresh_current_month().await {
                tracing::error!(error = %e, "session refresh failed");
            }

            let wait = match self.until_next_month() {
                Some(wait) => wait,
                None => {
                    tracing::error!("cannot resolve next month boundary, stopping");
                    break;
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.wait_for_stop() => break,
            }
        }

        tracing::info!("session pipeline stopped");
    }

    /// Stop the monthly loop.
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
    }

    /// Check if the monthly loop is running.
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Duration from now until the first instant of the next local month.
    fn until_next_month(&self) -> Option<std::time::Duration> {
        let tz = self.config.timezone;
        let now = Utc::now();
        let local = now.with_timezone(&tz);

        let (year, month) = if local.month() == 12 {
            (local.year() + 1, 1)
        } else {
            (local.year(), local.month() + 1)
        };
        let first = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
        let boundary = match tz.from_local_datetime(&first) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => return None,
        };

        (boundary.with_timezone(&Utc) - now).to_std().ok()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{ChannelResult, DeliveryStatus};
    use async_trait::async_trait;
    use chrono_tz::Tz::UTC;
    use std::sync::Mutex;

    struct RecordingSink {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DeliverySink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, text: &str, destination: &str) -> ChannelResult<DeliveryStatus> {
            self.sent
                .lock()
                .unwrap()
                .push((text.to_string(), destination.to_string()));
            Ok(DeliveryStatus::success("recording", destination))
        }
    }

    fn pipeline(anchor: DateTime<Utc>, pattern: Vec<i64>, dir: &std::path::Path) -> SessionPipeline {
        SessionPipeline::new(
            Arc::new(RecordingSink::new()),
            Arc::new(TriggerRegistry::new("sessions", UTC)),
            AuditLog::new(dir),
            SessionPipelineConfig {
                anchor,
                pattern,
                timezone: UTC,
                lead: Duration::minutes(10),
                destination: "sessions-room".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_refresh_installs_future_slots_and_writes_audit() {
        let temp = tempfile::tempdir().unwrap();

        // Anchor one hour from now with a 24h pattern: every slot in the
        // current month that the generator visits is in the future.
        let anchor = Utc::now() + Duration::hours(1);
        let local = Utc::now().with_timezone(&UTC);
        let pipeline = pipeline(anchor, vec![24], temp.path());

        let installed = pipeline
            .refresh_month(local.year(), local.month())
            .await
            .unwrap();

        // Slot count varies with the day of month, but at least the first
        // advance (anchor + 24h) lands inside the month near month start;
        // at month end it may roll over, so only assert consistency.
        assert_eq!(pipeline.registry().len().await, installed);
        assert!(pipeline
            .audit
            .month_file(local.year(), local.month())
            .exists());
    }

    #[tokio::test]
    async fn test_refresh_replaces_previous_month_set() {
        let temp = tempfile::tempdir().unwrap();
        let anchor = Utc::now() + Duration::hours(1);
        let local = Utc::now().with_timezone(&UTC);
        let pipeline = pipeline(anchor, vec![24], temp.path());

        let first = pipeline
            .refresh_month(local.year(), local.month())
            .await
            .unwrap();
        let second = pipeline
            .refresh_month(local.year(), local.month())
            .await
            .unwrap();

        // Same inputs produce the same plan; the registry holds exactly one
        // set, not the union of both runs.
        assert_eq!(first, second);
        assert_eq!(pipeline.registry().len().await, second);
    }

    #[tokio::test]
    async fn test_refresh_rejects_invalid_pattern() {
        let temp = tempfile::tempdir().unwrap();
        let pipeline = pipeline(Utc::now(), vec![], temp.path());

        let result = pipeline.refresh_current_month().await;
        assert!(result.is_err());
        assert!(pipeline.registry().is_empty().await);
    }

    #[test]
    fn test_until_next_month_is_bounded() {
        let temp = tempfile::tempdir().unwrap();
        let pipeline = pipeline(Utc::now(), vec![24], temp.path());

        let wait = pipeline.until_next_month().unwrap();
        // Never more than 31 days and change.
        assert!(wait <= std::time::Duration::from_secs(32 * 24 * 3600));
    }
}
