//! Reminder feed: overdue doses and doses coming due soon.
//!
//! Derived from [`ScheduleProjection`] at read time, like the countdown.

use serde::Serialize;

use super::projection::{days_until, ScheduleProjection};
use crate::models::ScheduleEntry;

/// Look-ahead used when the caller does not pick one.
pub const DEFAULT_REMINDER_WINDOW_DAYS: i64 = 7;
pub const MAX_REMINDER_WINDOW_DAYS: i64 = 366;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReminderKind {
    #[serde(rename_all = "camelCase")]
    DueSoon { days_left: i64 },
    #[serde(rename_all = "camelCase")]
    Overdue { days_overdue: i64 },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub entry: ScheduleEntry,
    #[serde(flatten)]
    pub kind: ReminderKind,
}

/// Overdue entries first (longest overdue leading), then entries due within
/// `window_days` of the projection date, soonest first. Due today counts as
/// due soon with zero days left.
pub fn reminders(projection: &ScheduleProjection, window_days: i64) -> Vec<Reminder> {
    let today = projection.today;
    projection
        .ordered
        .iter()
        .take_while(|e| e.is_upcoming())
        .map_while(|entry| {
            let kind = if projection.is_overdue(entry) {
                ReminderKind::Overdue {
                    days_overdue: (today - entry.due_date).num_days(),
                }
            } else {
                let days_left = days_until(entry.due_date, today);
                if days_left > window_days {
                    return None;
                }
                ReminderKind::DueSoon { days_left }
            };
            Some(Reminder {
                entry: entry.clone(),
                kind,
            })
        })
        .collect()
}
