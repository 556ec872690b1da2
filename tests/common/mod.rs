//! Common test utilities
//!
//! Shared by several integration suites; each compiles its own copy, so
//! not every helper is referenced from every binary.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, FixedOffset, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use macrowatch::feed::{FeedError, FeedResult, FeedSource};
use macrowatch::models::{Event, Impact};
use macrowatch::notify::{ChannelError, ChannelResult, DeliverySink, DeliveryStatus};

/// Create a test event at a fixed, known instant (2025-06-06 08:30 EDT).
pub fn nfp_event() -> Event {
    let at = FixedOffset::west_opt(4 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 6, 6, 8, 30, 0)
        .unwrap();
    let mut event = Event::new("Non-Farm Payrolls", Impact::High, "USD", at);
    event.forecast = Some("185K".to_string());
    event.previous = Some("177K".to_string());
    event
}

/// Create a test event scheduled a fixed number of hours in the future.
pub fn event_in(title: &str, impact: Impact, country: &str, hours: i64) -> Event {
    let at = (Utc::now() + Duration::hours(hours))
        .with_timezone(&FixedOffset::east_opt(0).unwrap());
    Event::new(title, impact, country, at)
}

/// Feed double serving a fixed event list, switchable into failure mode.
pub struct StubFeed {
    events: Vec<Event>,
    fail: AtomicBool,
}

impl StubFeed {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl FeedSource for StubFeed {
    async fn fetch(&self) -> FeedResult<Vec<Event>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FeedError::Status { status: 503 });
        }
        Ok(self.events.clone())
    }
}

/// Sink double recording every delivery, switchable into failure mode.
pub struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str, destination: &str) -> ChannelResult<DeliveryStatus> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChannelError::Rejected {
                status: 500,
                body: "stub failure".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((text.to_string(), destination.to_string()));
        Ok(DeliveryStatus::success("recording", destination))
    }
}
