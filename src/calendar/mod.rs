//! Event filtering and local-calendar-day grouping
//!
//! Grouping is a wall-clock question: an event belongs to the local calendar
//! day its instant falls on in the *target* timezone, which may differ from
//! the day in the feed's source offset. Two instants share a [`DateKey`] iff
//! they fall on the same local day in that zone.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Event, EventFilter};

/// Canonical local-calendar-day identifier used as the grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Derive the key for an instant observed in `tz`.
    pub fn from_instant(instant: DateTime<Utc>, tz: Tz) -> Self {
        Self(instant.with_timezone(&tz).date_naive())
    }

    /// The local calendar date this key identifies.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Retain events matching the filter's exact-match predicate set.
///
/// Order is preserved and nothing is deduplicated.
pub fn filter_events(events: Vec<Event>, filter: &EventFilter) -> Vec<Event> {
    events.into_iter().filter(|e| filter.matches(e)).collect()
}

/// Group events into per-local-date buckets in `tz`.
///
/// Buckets are keyed by [`DateKey`] and emitted in ascending date order;
/// within a bucket, events keep their input order. The grouping is rebuilt
/// fully on every pipeline run.
pub fn group_by_date_key(events: &[Event], tz: Tz) -> BTreeMap<DateKey, Vec<Event>> {
    let mut groups: BTreeMap<DateKey, Vec<Event>> = BTreeMap::new();
    for event in events {
        let key = DateKey::from_instant(event.scheduled_at_utc(), tz);
        groups.entry(key).or_default().push(event.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Impact;
    use chrono::{FixedOffset, TimeZone};
    use chrono_tz::America::New_York;
    use chrono_tz::Asia::Tokyo;

    fn utc_event(title: &str, h: u32, m: u32) -> Event {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 2, h, m, 0)
            .unwrap();
        Event::new(title, Impact::High, "USD", at)
    }

    #[test]
    fn test_date_key_display_is_canonical() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap();
        let key = DateKey::from_instant(instant, New_York);
        assert_eq!(key.to_string(), "2025-06-02");
    }

    #[test]
    fn test_same_local_day_same_key() {
        let morning = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2025, 6, 2, 23, 0, 0).unwrap();
        assert_eq!(
            DateKey::from_instant(morning, New_York),
            DateKey::from_instant(evening, New_York)
        );
    }

    #[test]
    fn test_key_follows_target_zone_not_source() {
        // 23:00 UTC on June 2nd is already June 3rd in Tokyo.
        let late = Utc.with_ymd_and_hms(2025, 6, 2, 23, 0, 0).unwrap();
        let key = DateKey::from_instant(late, Tokyo);
        assert_eq!(key.to_string(), "2025-06-03");
    }

    #[test]
    fn test_filter_preserves_order() {
        let events = vec![
            utc_event("A", 10, 0),
            utc_event("B", 11, 0),
            utc_event("C", 12, 0),
        ];
        let filter = EventFilter {
            impacts: vec![Impact::High],
            countries: vec![],
        };

        let kept = filter_events(events, &filter);
        let titles: Vec<_> = kept.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }

    #[test]
    fn test_group_insertion_order_within_bucket() {
        let events = vec![
            utc_event("first", 9, 0),
            utc_event("second", 10, 0),
            utc_event("third", 11, 0),
        ];

        let groups = group_by_date_key(&events, New_York);
        assert_eq!(groups.len(), 1);

        let bucket = groups.values().next().unwrap();
        let titles: Vec<_> = bucket.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[test]
    fn test_group_splits_across_local_midnight() {
        // 03:00 UTC June 2nd is still June 1st in New York (23:00 EDT).
        let before_midnight = utc_event("late", 3, 0);
        let after_midnight = utc_event("early", 5, 0); // 01:00 EDT June 2nd

        let groups = group_by_date_key(&[before_midnight, after_midnight], New_York);
        assert_eq!(groups.len(), 2);

        let keys: Vec<_> = groups.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["2025-06-01", "2025-06-02"]);
    }
}
