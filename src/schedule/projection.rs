//! Read-time countdown view over a member's schedule. Never persisted.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::ScheduleEntry;

/// Ordered schedule plus the nearest upcoming dose, relative to `today`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleProjection {
    pub today: NaiveDate,
    /// Upcoming first, then everything else; each group by due date.
    pub ordered: Vec<ScheduleEntry>,
    pub next: Option<ScheduleEntry>,
    /// Days until `next` is due, never negative; 0 without a next entry.
    pub days_left: i64,
    pub upcoming_count: u32,
    pub overdue_count: u32,
    pub completed_count: u32,
}

impl ScheduleProjection {
    pub fn is_overdue(&self, entry: &ScheduleEntry) -> bool {
        is_overdue(entry, self.today)
    }
}

/// Upcoming and due strictly before `today`. An entry due today is not overdue.
pub fn is_overdue(entry: &ScheduleEntry, today: NaiveDate) -> bool {
    entry.is_upcoming() && entry.due_date < today
}

/// Whole days from `today` until `due`, floored at zero.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days().max(0)
}

pub fn project(schedule: &[ScheduleEntry], today: NaiveDate) -> ScheduleProjection {
    let mut ordered = schedule.to_vec();
    // Stable: equal due dates keep their stored order.
    ordered.sort_by_key(|e| (!e.is_upcoming(), e.due_date));

    let next = ordered.iter().find(|e| e.is_upcoming()).cloned();
    let days_left = next
        .as_ref()
        .map(|e| days_until(e.due_date, today))
        .unwrap_or(0);

    let upcoming_count = ordered.iter().filter(|e| e.is_upcoming()).count() as u32;
    let overdue_count = ordered.iter().filter(|e| is_overdue(e, today)).count() as u32;

    ScheduleProjection {
        today,
        completed_count: ordered.len() as u32 - upcoming_count,
        ordered,
        next,
        days_left,
        upcoming_count,
        overdue_count,
    }
}
