use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ScheduleStatus;

/// One recommended dose of one vaccine for one member.
///
/// `(member_id, vaccine_id, dose)` is unique across a member's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub member_id: Uuid,
    pub vaccine_id: String,
    /// Copied from the reference table when the entry was generated.
    pub vaccine_name: String,
    pub due_date: NaiveDate,
    /// 1-based position in the vaccine's dose list.
    pub dose: u32,
    pub status: ScheduleStatus,
}

impl ScheduleEntry {
    pub fn dose_key(&self) -> (&str, u32) {
        (self.vaccine_id.as_str(), self.dose)
    }

    pub fn is_upcoming(&self) -> bool {
        self.status == ScheduleStatus::Upcoming
    }
}
