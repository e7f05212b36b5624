//! Schedule generation: birth date + vaccine selection → one entry per dose.

use std::collections::HashSet;

use chrono::{Months, NaiveDate};
use uuid::Uuid;

use super::reference::VaccineCatalog;
use super::ScheduleError;
use crate::models::enums::ScheduleStatus;
use crate::models::ScheduleEntry;

/// Output of [`generate`].
#[derive(Debug, Clone, Default)]
pub struct GeneratedSchedule {
    /// Selection order, doses ascending within a vaccine.
    pub entries: Vec<ScheduleEntry>,
    /// Requested ids with no reference definition. They produce no entries.
    pub unknown_vaccine_ids: Vec<String>,
}

/// `birth_date` plus `offset_months` calendar months.
///
/// A day that does not exist in the target month clamps to that month's
/// last day: 2024-01-31 + 1 month = 2024-02-29.
pub fn due_date_for(birth_date: NaiveDate, offset_months: u32) -> Result<NaiveDate, ScheduleError> {
    birth_date
        .checked_add_months(Months::new(offset_months))
        .ok_or(ScheduleError::DateOutOfRange {
            birth_date,
            offset_months,
        })
}

/// Build upcoming dose entries for `member_id` from the reference table.
///
/// Repeated ids in `vaccine_ids` are generated once. Unknown ids are
/// skipped and reported back rather than failing the whole request.
/// `birth_date` is assumed already validated by the caller.
pub fn generate<S: AsRef<str>>(
    catalog: &VaccineCatalog,
    member_id: Uuid,
    birth_date: NaiveDate,
    vaccine_ids: &[S],
) -> Result<GeneratedSchedule, ScheduleError> {
    let mut seen = HashSet::new();
    let mut generated = GeneratedSchedule::default();

    for vaccine_id in vaccine_ids.iter().map(AsRef::as_ref) {
        if !seen.insert(vaccine_id) {
            continue;
        }

        let Some(definition) = catalog.get(vaccine_id) else {
            tracing::warn!(vaccine_id, "Unknown vaccine requested, skipping");
            generated.unknown_vaccine_ids.push(vaccine_id.to_string());
            continue;
        };

        for (index, &offset) in definition.age_offsets_months.iter().enumerate() {
            generated.entries.push(ScheduleEntry {
                id: Uuid::new_v4(),
                member_id,
                vaccine_id: definition.id.clone(),
                vaccine_name: definition.name.clone(),
                due_date: due_date_for(birth_date, offset)?,
                dose: index as u32 + 1,
                status: ScheduleStatus::Upcoming,
            });
        }
    }

    tracing::debug!(
        %member_id,
        entries = generated.entries.len(),
        unknown = generated.unknown_vaccine_ids.len(),
        "Schedule generated"
    );
    Ok(generated)
}
