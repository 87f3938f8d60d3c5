//! Per-day capacity tracking over the planning horizon.

use chrono::{Days, NaiveDate};

use crate::config::DailyCapacity;
use crate::models::{ScheduleAllocation, ScheduleDay};

/// Booked minutes for one calendar day.
#[derive(Clone, Debug)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub capacity_minutes: u32,
    /// Minutes booked so far, pinned work included (may exceed capacity)
    pub used_minutes: u32,
    /// Share of `used_minutes` spent on HIGH-energy tasks
    pub high_energy_minutes: u32,
    pub allocations: Vec<ScheduleAllocation>,
}

impl DaySlot {
    pub fn free_minutes(&self) -> u32 {
        self.capacity_minutes.saturating_sub(self.used_minutes)
    }

    pub fn has_task(&self, task_id: &str) -> bool {
        self.allocations.iter().any(|a| a.task_id == task_id)
    }
}

/// Consecutive days from the start date, each with its own capacity.
///
/// Invariant: `slots[i].date == start_date + i`.
#[derive(Clone, Debug)]
pub struct DayLedger {
    start_date: NaiveDate,
    slots: Vec<DaySlot>,
}

impl DayLedger {
    pub fn new(start_date: NaiveDate, max_days: u32, capacity: &DailyCapacity) -> Self {
        let slots = (0..max_days as u64)
            .map_while(|offset| start_date.checked_add_days(Days::new(offset)))
            .map(|date| DaySlot {
                date,
                capacity_minutes: capacity.minutes_for(date),
                used_minutes: 0,
                high_energy_minutes: 0,
                allocations: Vec::new(),
            })
            .collect();
        Self { start_date, slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, idx: usize) -> &DaySlot {
        &self.slots[idx]
    }

    /// Slot index of a date, if it lies inside the horizon.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start_date).num_days();
        if offset < 0 || offset as usize >= self.slots.len() {
            return None;
        }
        Some(offset as usize)
    }

    /// Book minutes for a task on a day. Capacity is not checked here.
    pub fn book(&mut self, idx: usize, task_id: &str, minutes: u32, high_energy: bool) {
        let slot = &mut self.slots[idx];
        slot.used_minutes += minutes;
        if high_energy {
            slot.high_energy_minutes += minutes;
        }
        slot.allocations.push(ScheduleAllocation {
            task_id: task_id.to_string(),
            day: slot.date,
            minutes_allocated: minutes,
        });
    }

    pub fn into_days(self) -> Vec<ScheduleDay> {
        self.slots
            .into_iter()
            .map(|slot| ScheduleDay {
                date: slot.date,
                capacity_minutes: slot.capacity_minutes,
                allocations: slot.allocations,
            })
            .collect()
    }
}
