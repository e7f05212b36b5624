//! Folding freshly generated entries into an existing schedule.

use std::collections::HashSet;

use crate::models::ScheduleEntry;

/// Append each incoming entry whose `(vaccine_id, dose)` is not already
/// present.
///
/// Existing entries are kept verbatim and first, so a completed dose is never
/// reset by regenerating. Duplicates within `incoming` keep the first one.
pub fn merge(
    existing: Vec<ScheduleEntry>,
    incoming: impl IntoIterator<Item = ScheduleEntry>,
) -> Vec<ScheduleEntry> {
    let mut keys: HashSet<(String, u32)> = existing
        .iter()
        .map(|e| (e.vaccine_id.clone(), e.dose))
        .collect();

    let mut merged = existing;
    for entry in incoming {
        if keys.insert((entry.vaccine_id.clone(), entry.dose)) {
            merged.push(entry);
        }
    }
    merged
}
