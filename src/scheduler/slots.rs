//! Pattern-based slot generation
//!
//! This module turns a repeating hour-offset pattern anchored at a fixed
//! instant into the set of recurring instants that fall inside one target
//! calendar month, evaluated in a named timezone. Month membership is a
//! wall-clock question: an instant belongs to the month its local date in
//! the target zone says it does, not the month of its UTC representation.

use chrono::{DateTime, Datelike, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::error::{SchedulerError, SchedulerResult};

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of pattern advancements per generation.
///
/// Guards against an anchor pathologically far from the target month. When
/// the cap is hit, whatever was accumulated is returned and the plan is
/// marked truncated so callers can tell this apart from a naturally
/// exhausted month.
pub const MAX_CYCLES: usize = 10_000;

// ============================================================================
// Slot Plan
// ============================================================================

/// The result of one slot generation pass for a target month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotPlan {
    /// Target year the slots were generated for
    pub year: i32,

    /// Target month (1-12)
    pub month: u32,

    /// Generated instants, strictly ascending, no duplicates
    pub slots: Vec<DateTime<Utc>>,

    /// Whether generation stopped at [`MAX_CYCLES`] before reaching the
    /// end of the target month
    pub truncated: bool,

    /// When this plan was generated
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl SlotPlan {
    /// Number of slots in the plan
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the plan contains no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Format the plan as a human-readable listing: one line per slot with
    /// its index, absolute instant, and localized instant.
    pub fn display(&self, tz: Tz) -> String {
        let mut output = format!(
            "Slot plan {:04}-{:02} ({} slots{})\n",
            self.year,
            self.month,
            self.slots.len(),
            if self.truncated { ", TRUNCATED" } else { "" }
        );
        output.push_str(&format!("{:-<70}\n", ""));

        for (i, slot) in self.slots.iter().enumerate() {
            let local = slot.with_timezone(&tz);
            output.push_str(&format!(
                "{:>4}  {}  {}\n",
                i + 1,
                slot.format("%Y-%m-%d %H:%M:%S UTC"),
                local.format("%Y-%m-%d %H:%M:%S %Z"),
            ));
        }

        output
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Generate the slot plan for one target month.
///
/// Starting at `anchor`, the repeating `pattern` of positive hour offsets is
/// advanced indefinitely (cycling). Each visited instant is classified by
/// its (year, month) as observed in `tz`:
///
/// - past the target month: generation stops;
/// - inside the target month: the instant is emitted as a main slot and a
///   clone slot one hour later is emitted too, unless the clone's local
///   month has already left the target (a clone near the month boundary is
///   dropped rather than leaking into the next month);
/// - before the target month: nothing is emitted, advancement continues.
///
/// The returned sequence is sorted ascending and deduplicated regardless of
/// generation order, since clone insertion can interleave with subsequent
/// mains when pattern steps are short.
pub fn generate(
    anchor: DateTime<Utc>,
    pattern: &[i64],
    target_year: i32,
    target_month: u32,
    tz: Tz,
) -> SchedulerResult<SlotPlan> {
    validate_pattern(pattern)?;
    if !(1..=12).contains(&target_month) {
        return Err(SchedulerError::invalid_month(target_month));
    }

    let mut cursor = anchor;
    let mut slots: Vec<DateTime<Utc>> = Vec::new();
    let mut truncated = true;

    for cycle in 0..MAX_CYCLES {
        cursor += Duration::hours(pattern[cycle % pattern.len()]);

        let local = cursor.with_timezone(&tz);
        match (local.year(), local.month()).cmp(&(target_year, target_month)) {
            std::cmp::Ordering::Greater => {
                truncated = false;
                break;
            }
            std::cmp::Ordering::Equal => {
                slots.push(cursor);

                let clone = cursor + Duration::hours(1);
                let clone_local = clone.with_timezone(&tz);
                if (clone_local.year(), clone_local.month()) == (target_year, target_month) {
                    slots.push(clone);
                }
            }
            std::cmp::Ordering::Less => {}
        }
    }

    if truncated {
        tracing::warn!(
            target_year,
            target_month,
            accumulated = slots.len(),
            "slot generation hit the cycle cap before leaving the target month"
        );
    }

    slots.sort_unstable();
    slots.dedup();

    Ok(SlotPlan {
        year: target_year,
        month: target_month,
        slots,
        truncated,
        generated_at: Utc::now(),
    })
}

fn validate_pattern(pattern: &[i64]) -> SchedulerResult<()> {
    if pattern.is_empty() {
        return Err(SchedulerError::EmptyPattern);
    }
    if let Some(&bad) = pattern.iter().find(|&&h| h <= 0) {
        return Err(SchedulerError::invalid_offset(bad));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
