//! Recurring definitions and their materialization into dated tasks.
//!
//! A [`RecurrenceRule`] knows how to find the next occurrence after a date.
//! [`materialize`] walks that rule from a cursor through the lookahead window
//! and asks the definition to build one task per new occurrence. The task and
//! meeting variants live in their own modules.

mod meeting;
mod task;

pub use meeting::{build_agenda, ensure_upcoming_meetings, CheckIn, MeetingDefinition};
pub use task::{ensure_upcoming_tasks, start_not_before_for, RecurringTaskDefinition};

use chrono::{Datelike, Days, Duration, NaiveDate};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::models::Task;
use crate::{log_changes, log_checks};

/// How often a definition repeats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    /// Anchor weekday, every week
    Weekly,
    /// Anchor weekday, every other week counted from the anchor
    Biweekly,
    /// Anchor day of month, clipped to the month's length
    Monthly,
    /// Anchor day of month, every other month counted from the anchor
    Bimonthly,
    /// Fixed interval from the anchor
    Custom { interval_days: u32 },
}

/// A frequency pinned to an anchor date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub anchor_date: NaiveDate,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, anchor_date: NaiveDate) -> Self {
        Self {
            frequency,
            anchor_date,
        }
    }

    /// First occurrence strictly after `after`. Never earlier than the anchor.
    ///
    /// Returns `None` only for a zero custom interval or a date out of range.
    pub fn next_occurrence_after(&self, after: NaiveDate) -> Option<NaiveDate> {
        let from = after.succ_opt()?.max(self.anchor_date);
        match self.frequency {
            Frequency::Daily => Some(from),
            Frequency::Weekly => self.next_weekday(from),
            Frequency::Biweekly => {
                let candidate = self.next_weekday(from)?;
                let weeks = (candidate - self.anchor_date).num_days() / 7;
                if weeks % 2 == 0 {
                    Some(candidate)
                } else {
                    candidate.checked_add_signed(Duration::days(7))
                }
            }
            Frequency::Monthly => self.next_month_day(from, 1),
            Frequency::Bimonthly => self.next_month_day(from, 2),
            Frequency::Custom { interval_days } => {
                if interval_days == 0 {
                    return None;
                }
                let step = interval_days as i64;
                let elapsed = (from - self.anchor_date).num_days();
                let k = (elapsed + step - 1) / step;
                self.anchor_date.checked_add_signed(Duration::days(k * step))
            }
        }
    }

    fn next_weekday(&self, from: NaiveDate) -> Option<NaiveDate> {
        let target = self.anchor_date.weekday().num_days_from_monday() as i64;
        let current = from.weekday().num_days_from_monday() as i64;
        from.checked_add_signed(Duration::days((target - current).rem_euclid(7)))
    }

    /// Anchor day of month in the first month at or after `from` whose offset
    /// from the anchor month is a multiple of `every`.
    fn next_month_day(&self, from: NaiveDate, every: i32) -> Option<NaiveDate> {
        let anchor_index = month_index(self.anchor_date);
        let mut index = month_index(from);
        let offset = (index - anchor_index).rem_euclid(every);
        if offset != 0 {
            index += every - offset;
        }
        loop {
            let candidate = clipped_day(index, self.anchor_date.day())?;
            if candidate >= from {
                return Some(candidate);
            }
            index += every;
        }
    }
}

fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// `day` in the month at `index`, clipped to the month's last day.
fn clipped_day(index: i32, day: u32) -> Option<NaiveDate> {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let last = last_day_of_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last))
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt().map(|d| d.day())
}

/// Common view of a recurring definition.
pub trait RecurringDefinition {
    fn definition_id(&self) -> &str;
    fn rule(&self) -> &RecurrenceRule;
    fn is_active(&self) -> bool;
    /// Last occurrence already generated, if any.
    fn last_generated(&self) -> Option<NaiveDate>;
    /// No occurrences after this date.
    fn end_date(&self) -> Option<NaiveDate> {
        None
    }
}

/// Deterministic id of the instance for one occurrence.
pub fn instance_id(definition_id: &str, occurrence: NaiveDate) -> String {
    format!("{}:{}", definition_id, occurrence.format("%Y-%m-%d"))
}

/// Where a definition's cursor ended after materialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationCursor {
    pub definition_id: String,
    pub last_generated: NaiveDate,
}

/// Output of a materialization pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Materialized {
    /// Newly created instances only.
    pub created: Vec<Task>,
    /// Advanced cursors, one per definition that saw at least one occurrence.
    pub cursors: Vec<GenerationCursor>,
}

/// Occurrences of a rule inside the lookahead window, starting after the
/// later of `last_generated` and yesterday.
pub fn upcoming_occurrences(
    rule: &RecurrenceRule,
    last_generated: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
    lookahead_days: u32,
) -> Vec<NaiveDate> {
    let horizon = today
        .checked_add_days(Days::new(lookahead_days as u64))
        .unwrap_or(NaiveDate::MAX);
    let horizon = end_date.map_or(horizon, |end| end.min(horizon));
    let yesterday = today.pred_opt().unwrap_or(today);
    let mut cursor = last_generated.map_or(yesterday, |last| last.max(yesterday));

    let mut occurrences = Vec::new();
    while let Some(next) = rule.next_occurrence_after(cursor) {
        if next > horizon {
            break;
        }
        occurrences.push(next);
        cursor = next;
    }
    occurrences
}

/// Materialize every active definition into new instances.
///
/// Idempotent: an occurrence that already has an instance (same definition and
/// due date, or the same instance id) is skipped, though the cursor still moves
/// past it.
pub fn materialize<D, F>(
    definitions: &[D],
    existing: &[Task],
    today: NaiveDate,
    lookahead_days: u32,
    verbosity: u8,
    mut build: F,
) -> Materialized
where
    D: RecurringDefinition,
    F: FnMut(&D, NaiveDate) -> Task,
{
    let existing_ids: FxHashSet<&str> = existing.iter().map(|t| t.id.as_str()).collect();
    let existing_dates: FxHashSet<(&str, NaiveDate)> = existing
        .iter()
        .filter_map(|t| Some((t.recurrence_id.as_deref()?, t.due_date?)))
        .collect();

    let mut result = Materialized::default();

    for definition in definitions {
        if !definition.is_active() {
            log_checks!(verbosity, "Skipping inactive definition {}", definition.definition_id());
            continue;
        }
        let def_id = definition.definition_id();
        let occurrences = upcoming_occurrences(
            definition.rule(),
            definition.last_generated(),
            definition.end_date(),
            today,
            lookahead_days,
        );

        for &occurrence in &occurrences {
            if existing_dates.contains(&(def_id, occurrence))
                || existing_ids.contains(instance_id(def_id, occurrence).as_str())
            {
                log_checks!(verbosity, "  {} already has an instance on {}", def_id, occurrence);
                continue;
            }
            let task = build(definition, occurrence);
            log_changes!(verbosity, "  Materialized {} for {}", task.id, occurrence);
            result.created.push(task);
        }

        if let Some(&last) = occurrences.last() {
            result.cursors.push(GenerationCursor {
                definition_id: def_id.to_string(),
                last_generated: last,
            });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_daily_never_before_anchor() {
        let rule = RecurrenceRule::new(Frequency::Daily, d(2025, 1, 10));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 1)), Some(d(2025, 1, 10)));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 10)), Some(d(2025, 1, 11)));
    }

    #[test]
    fn test_weekly_matches_anchor_weekday() {
        // 2025-01-06 is a Monday
        let rule = RecurrenceRule::new(Frequency::Weekly, d(2025, 1, 6));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 6)), Some(d(2025, 1, 13)));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 8)), Some(d(2025, 1, 13)));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 12)), Some(d(2025, 1, 13)));
    }

    #[test]
    fn test_biweekly_keeps_anchor_parity() {
        let rule = RecurrenceRule::new(Frequency::Biweekly, d(2025, 1, 6));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 6)), Some(d(2025, 1, 20)));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 14)), Some(d(2025, 1, 20)));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 20)), Some(d(2025, 2, 3)));
    }

    #[test]
    fn test_monthly_clips_to_month_end() {
        let rule = RecurrenceRule::new(Frequency::Monthly, d(2025, 1, 31));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 31)), Some(d(2025, 2, 28)));
        assert_eq!(rule.next_occurrence_after(d(2025, 2, 28)), Some(d(2025, 3, 31)));
        assert_eq!(rule.next_occurrence_after(d(2025, 4, 1)), Some(d(2025, 4, 30)));
        // Leap year
        assert_eq!(rule.next_occurrence_after(d(2028, 2, 1)), Some(d(2028, 2, 29)));
    }

    #[test]
    fn test_bimonthly_aligned_to_anchor_month() {
        let rule = RecurrenceRule::new(Frequency::Bimonthly, d(2025, 1, 15));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 15)), Some(d(2025, 3, 15)));
        assert_eq!(rule.next_occurrence_after(d(2025, 2, 20)), Some(d(2025, 3, 15)));
        assert_eq!(rule.next_occurrence_after(d(2025, 3, 16)), Some(d(2025, 5, 15)));
        assert_eq!(rule.next_occurrence_after(d(2025, 11, 20)), Some(d(2026, 1, 15)));
    }

    #[test]
    fn test_custom_interval() {
        let rule = RecurrenceRule::new(Frequency::Custom { interval_days: 10 }, d(2025, 1, 1));
        assert_eq!(rule.next_occurrence_after(d(2024, 12, 1)), Some(d(2025, 1, 1)));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 1)), Some(d(2025, 1, 11)));
        assert_eq!(rule.next_occurrence_after(d(2025, 1, 15)), Some(d(2025, 1, 21)));

        let zero = RecurrenceRule::new(Frequency::Custom { interval_days: 0 }, d(2025, 1, 1));
        assert_eq!(zero.next_occurrence_after(d(2025, 1, 1)), None);
    }

    #[test]
    fn test_upcoming_window() {
        let rule = RecurrenceRule::new(Frequency::Weekly, d(2025, 1, 6));
        let today = d(2025, 1, 13);
        let dates = upcoming_occurrences(&rule, None, None, today, 14);
        assert_eq!(dates, vec![d(2025, 1, 13), d(2025, 1, 20), d(2025, 1, 27)]);

        // Cursor already past the first two
        let dates = upcoming_occurrences(&rule, Some(d(2025, 1, 20)), None, today, 14);
        assert_eq!(dates, vec![d(2025, 1, 27)]);

        // Series ends early
        let dates = upcoming_occurrences(&rule, None, Some(d(2025, 1, 19)), today, 14);
        assert_eq!(dates, vec![d(2025, 1, 13)]);
    }

    #[test]
    fn test_window_clamped_at_calendar_end() {
        let rule = RecurrenceRule::new(Frequency::Weekly, d(2025, 1, 6));
        let dates = upcoming_occurrences(&rule, None, Some(d(2025, 1, 27)), d(2025, 1, 13), u32::MAX);
        assert_eq!(dates, vec![d(2025, 1, 13), d(2025, 1, 20), d(2025, 1, 27)]);

        let daily = RecurrenceRule::new(Frequency::Daily, d(2025, 1, 1));
        let last = NaiveDate::MAX;
        let today = last.pred_opt().unwrap();
        assert_eq!(upcoming_occurrences(&daily, None, None, today, 30), vec![today, last]);
    }
}
