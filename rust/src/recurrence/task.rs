//! Recurring task definitions.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::RecurrenceConfig;
use crate::models::{Level, Task};

use super::{instance_id, materialize, Frequency, Materialized, RecurrenceRule, RecurringDefinition};

/// Template for a task that repeats on a rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecurringTaskDefinition {
    pub id: String,
    pub title: String,
    pub rule: RecurrenceRule,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub last_generated: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub importance: Level,
    #[serde(default)]
    pub urgency: Level,
    #[serde(default)]
    pub energy_level: Level,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub phase_id: Option<String>,
}

fn default_active() -> bool {
    true
}

impl RecurringTaskDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>, rule: RecurrenceRule) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            rule,
            active: true,
            last_generated: None,
            end_date: None,
            estimated_minutes: None,
            importance: Level::Medium,
            urgency: Level::Medium,
            energy_level: Level::Medium,
            project_id: None,
            phase_id: None,
        }
    }

    /// Concrete task for one occurrence.
    pub fn instantiate(&self, occurrence: NaiveDate) -> Task {
        let mut task = Task::new(instance_id(&self.id, occurrence), self.title.clone())
            .with_importance(self.importance)
            .with_urgency(self.urgency)
            .with_energy(self.energy_level)
            .with_due_date(occurrence)
            .with_start_not_before(start_not_before_for(&self.rule.frequency, occurrence));
        task.estimated_minutes = self.estimated_minutes;
        task.project_id = self.project_id.clone();
        task.phase_id = self.phase_id.clone();
        task.recurrence_id = Some(self.id.clone());
        task
    }
}

impl RecurringDefinition for RecurringTaskDefinition {
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

/// Earliest day an instance may be worked on.
///
/// Weekly series open on the Monday of the occurrence's week, monthly series on
/// the first of the month, everything else on the occurrence itself.
pub fn start_not_before_for(frequency: &Frequency, occurrence: NaiveDate) -> NaiveDate {
    match frequency {
        Frequency::Weekly | Frequency::Biweekly => {
            let back = occurrence.weekday().num_days_from_monday() as i64;
            occurrence
                .checked_sub_signed(Duration::days(back))
                .unwrap_or(occurrence)
        }
        Frequency::Monthly | Frequency::Bimonthly => occurrence.with_day(1).unwrap_or(occurrence),
        Frequency::Daily | Frequency::Custom { .. } => occurrence,
    }
}

/// Create the missing task instances for the lookahead window.
pub fn ensure_upcoming_tasks(
    definitions: &[RecurringTaskDefinition],
    existing: &[Task],
    today: NaiveDate,
    config: &RecurrenceConfig,
) -> Materialized {
    materialize(
        definitions,
        existing,
        today,
        config.lookahead_days,
        config.verbosity,
        |definition, occurrence| definition.instantiate(occurrence),
    )
}
