//! Recurring meetings with agendas built from recent check-ins.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::RecurrenceConfig;
use crate::models::{Level, Task};

use super::{instance_id, materialize, Materialized, RecurrenceRule, RecurringDefinition};

/// A repeating meeting linked to a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDefinition {
    pub id: String,
    pub title: String,
    pub project_id: Option<String>,
    pub rule: RecurrenceRule,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub last_generated: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
}

fn default_active() -> bool {
    true
}

fn default_duration() -> u32 {
    30
}

impl MeetingDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>, rule: RecurrenceRule) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            project_id: None,
            rule,
            active: true,
            last_generated: None,
            end_date: None,
            duration_minutes: default_duration(),
        }
    }
}

impl RecurringDefinition for MeetingDefinition {
    fn definition_id(&self) -> &str {
        &self.id
    }

    fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn last_generated(&self) -> Option<NaiveDate> {
        self.last_generated
    }

    fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
}

/// A short progress note recorded against a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub project_id: String,
    pub category: String,
    pub summary: String,
    pub recorded_on: NaiveDate,
}

/// Agenda text from the project's check-ins in `[today - lookback, today]`.
///
/// Categories are listed alphabetically, entries newest first. Returns `None`
/// when nothing falls in the window.
pub fn build_agenda(
    check_ins: &[CheckIn],
    project_id: &str,
    today: NaiveDate,
    lookback_days: u32,
) -> Option<String> {
    let since = today
        .checked_sub_days(Days::new(lookback_days as u64))
        .unwrap_or(NaiveDate::MIN);
    let mut by_category: BTreeMap<&str, Vec<&CheckIn>> = BTreeMap::new();
    for check_in in check_ins {
        if check_in.project_id == project_id
            && check_in.recorded_on >= since
            && check_in.recorded_on <= today
        {
            by_category
                .entry(check_in.category.as_str())
                .or_default()
                .push(check_in);
        }
    }
    if by_category.is_empty() {
        return None;
    }

    let mut sections = Vec::with_capacity(by_category.len());
    for (category, mut entries) in by_category {
        entries.sort_by(|a, b| b.recorded_on.cmp(&a.recorded_on));
        let mut section = format!("## {}", category);
        for entry in entries {
            section.push_str(&format!("\n- {} ({})", entry.summary, entry.recorded_on));
        }
        sections.push(section);
    }
    Some(sections.join("\n\n"))
}

/// Create the missing meeting instances for the lookahead window.
///
/// Each instance is pinned to its occurrence and carries the agenda as notes.
pub fn ensure_upcoming_meetings(
    definitions: &[MeetingDefinition],
    existing: &[Task],
    check_ins: &[CheckIn],
    today: NaiveDate,
    config: &RecurrenceConfig,
) -> Materialized {
    materialize(
        definitions,
        existing,
        today,
        config.lookahead_days,
        config.verbosity,
        |definition, occurrence| {
            let mut task = Task::new(instance_id(&definition.id, occurrence), definition.title.clone())
                .with_minutes(definition.duration_minutes)
                .with_urgency(Level::High)
                .with_due_date(occurrence)
                .with_start_not_before(occurrence)
                .with_pinned_date(occurrence);
            task.project_id = definition.project_id.clone();
            task.recurrence_id = Some(definition.id.clone());
            task.notes = definition.project_id.as_deref().and_then(|project| {
                build_agenda(check_ins, project, today, config.agenda_lookback_days)
            });
            task
        },
    )
}
