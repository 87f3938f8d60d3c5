//! Configuration types for the planning engine.
//!
//! All heuristics are tuning parameters. The contracts the engine keeps are
//! monotonicity of the due bonus and the energy-share threshold, not the
//! particular numbers below.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::Level;

/// Configuration for scoring and day-by-day placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Score weight per importance level: (high, medium, low)
    pub importance_weights: (f64, f64, f64),
    /// Score weight per urgency level: (high, medium, low)
    pub urgency_weights: (f64, f64, f64),
    /// Due bonus reached on/after the due date
    pub due_bonus_max: f64,
    /// Days before the due date at which the bonus starts ramping up
    pub due_bonus_window_days: u32,
    /// Multiplier for the grouping (project/phase) priority
    pub group_priority_weight: f64,
    /// Share of a day's capacity HIGH-energy work may take before the guard kicks in
    pub high_energy_share: f64,
    /// Smallest allocation a non-DONE task receives
    pub min_allocation_minutes: u32,
    /// Effort assumed for tasks without a positive estimate
    pub default_estimated_minutes: u32,
    /// Size of the "top N" subset in the today view
    pub top_n: usize,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    pub verbosity: u8,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            importance_weights: (30.0, 20.0, 10.0),
            urgency_weights: (25.0, 15.0, 5.0),
            due_bonus_max: 40.0,
            due_bonus_window_days: 14,
            group_priority_weight: 0.2,
            high_energy_share: 0.6,
            min_allocation_minutes: 5,
            default_estimated_minutes: 30,
            top_n: 3,
            verbosity: 0,
        }
    }
}

impl SchedulingConfig {
    pub fn importance_weight(&self, level: Level) -> f64 {
        pick(self.importance_weights, level)
    }

    pub fn urgency_weight(&self, level: Level) -> f64 {
        pick(self.urgency_weights, level)
    }
}

fn pick(weights: (f64, f64, f64), level: Level) -> f64 {
    match level {
        Level::High => weights.0,
        Level::Medium => weights.1,
        Level::Low => weights.2,
    }
}

/// Configuration for critical-chain buffers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Buffer size as a share of the critical chain length
    pub ratio: f64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { ratio: 0.5 }
    }
}

/// Configuration for baseline comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// |delay| up to this many days counts as on track
    pub on_track_threshold_days: i64,
    /// Minutes of work one day of phase delay is assumed to burn
    pub daily_capacity_minutes: u32,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            on_track_threshold_days: 1,
            daily_capacity_minutes: 480,
        }
    }
}

/// Configuration for recurring definitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceConfig {
    /// Materialize occurrences up to this many days after today
    pub lookahead_days: u32,
    /// Check-ins this many days back feed a meeting agenda
    pub agenda_lookback_days: u32,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    pub verbosity: u8,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            lookahead_days: 14,
            agenda_lookback_days: 14,
            verbosity: 0,
        }
    }
}

/// How much work fits into each calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyCapacity {
    /// Same minutes every day
    Flat(u32),
    /// Minutes per weekday, Monday first
    ByWeekday([u32; 7]),
}

impl DailyCapacity {
    pub fn from_hours(hours: f64) -> Self {
        DailyCapacity::Flat(hours_to_minutes(hours))
    }

    /// Build a weekday table from hours; weekdays not listed get zero capacity.
    pub fn from_weekday_hours(hours: &[(Weekday, f64)]) -> Self {
        let mut table = [0u32; 7];
        for (weekday, h) in hours {
            table[weekday.num_days_from_monday() as usize] = hours_to_minutes(*h);
        }
        DailyCapacity::ByWeekday(table)
    }

    pub fn minutes_for(&self, date: NaiveDate) -> u32 {
        match self {
            DailyCapacity::Flat(minutes) => *minutes,
            DailyCapacity::ByWeekday(table) => {
                table[date.weekday().num_days_from_monday() as usize]
            }
        }
    }
}

impl Default for DailyCapacity {
    fn default() -> Self {
        DailyCapacity::Flat(480)
    }
}

fn hours_to_minutes(hours: f64) -> u32 {
    (hours.max(0.0) * 60.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = SchedulingConfig::default();
        assert!(config.importance_weight(Level::High) > config.importance_weight(Level::Low));
        assert!(config.urgency_weight(Level::High) > config.urgency_weight(Level::Medium));
        assert_eq!(config.top_n, 3);
        assert!((BufferConfig::default().ratio - 0.5).abs() < 1e-9);
        assert_eq!(DiffConfig::default().on_track_threshold_days, 1);
    }

    #[test]
    fn test_weekday_capacity() {
        let capacity =
            DailyCapacity::from_weekday_hours(&[(Weekday::Mon, 8.0), (Weekday::Sat, 1.5)]);
        // 2025-01-06 is a Monday
        assert_eq!(capacity.minutes_for(d(2025, 1, 6)), 480);
        assert_eq!(capacity.minutes_for(d(2025, 1, 7)), 0);
        assert_eq!(capacity.minutes_for(d(2025, 1, 11)), 90);
        assert_eq!(DailyCapacity::from_hours(1.0).minutes_for(d(2025, 1, 7)), 60);
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: SchedulingConfig =
            serde_json::from_str(r#"{"high_energy_share": 0.5, "verbosity": 2}"#).unwrap();
        assert!((config.high_energy_share - 0.5).abs() < 1e-9);
        assert_eq!(config.verbosity, 2);
        assert_eq!(config.default_estimated_minutes, 30);
    }
}
