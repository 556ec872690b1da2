//! Alert message formatting

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::calendar::DateKey;
use crate::models::Event;

/// Format the daily summary for one local calendar day.
pub fn daily_summary(key: DateKey, events: &[Event], tz: Tz) -> String {
    let mut output = format!("Events for {} ({} scheduled)\n", key, events.len());

    for event in events {
        let local = event.scheduled_at_utc().with_timezone(&tz);
        output.push_str(&format!(
            "  {}  [{}] {} ({})",
            local.format("%H:%M"),
            event.impact.as_str().to_uppercase(),
            event.title,
            event.country,
        ));
        if let Some(forecast) = &event.forecast {
            output.push_str(&format!("  forecast: {forecast}"));
        }
        if let Some(previous) = &event.previous {
            output.push_str(&format!("  previous: {previous}"));
        }
        output.push('\n');
    }

    output
}

/// Format the heads-up message sent shortly before a single event.
pub fn pre_event(event: &Event, tz: Tz, lead: Duration) -> String {
    let local = event.scheduled_at_utc().with_timezone(&tz);
    let mut output = format!(
        "In {} min: [{}] {} ({}) at {}",
        lead.num_minutes(),
        event.impact.as_str().to_uppercase(),
        event.title,
        event.country,
        local.format("%H:%M %Z"),
    );
    if let Some(forecast) = &event.forecast {
        output.push_str(&format!(" | forecast {forecast}"));
    }
    if let Some(previous) = &event.previous {
        output.push_str(&format!(" | previous {previous}"));
    }
    output
}

/// Format the fixed-offset session alert for one generated slot.
pub fn session_alert(slot: DateTime<Utc>, tz: Tz, lead: Duration) -> String {
    let local = slot.with_timezone(&tz);
    format!(
        "Session window opens in {} min ({} local)",
        lead.num_minutes(),
        local.format("%Y-%m-%d %H:%M %Z"),
    )
}
