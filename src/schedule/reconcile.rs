//! Linking a completed vaccination back to the schedule entry it fulfills.

use uuid::Uuid;

use crate::models::enums::ScheduleStatus;
use crate::models::{CompletedRecord, ScheduleEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// An entry matched. `was_completed` is true when it already was.
    Fulfilled { entry_id: Uuid, was_completed: bool },
    /// No entry for this dose; the schedule is untouched.
    Unmatched,
}

/// Mark the first entry matching the record's member, vaccine and dose as
/// completed. Setting, not toggling, so applying twice is harmless.
pub fn reconcile_in_place(
    schedule: &mut [ScheduleEntry],
    record: &CompletedRecord,
) -> Reconciliation {
    let found = schedule.iter_mut().find(|e| {
        e.member_id == record.member_id && e.vaccine_id == record.vaccine_id && e.dose == record.dose
    });

    match found {
        Some(entry) => {
            let was_completed = entry.status == ScheduleStatus::Completed;
            entry.status = ScheduleStatus::Completed;
            Reconciliation::Fulfilled {
                entry_id: entry.id,
                was_completed,
            }
        }
        None => {
            tracing::debug!(
                member_id = %record.member_id,
                vaccine_id = %record.vaccine_id,
                dose = record.dose,
                "Record has no matching schedule entry"
            );
            Reconciliation::Unmatched
        }
    }
}

/// Copying form of [`reconcile_in_place`].
pub fn reconcile(schedule: &[ScheduleEntry], record: &CompletedRecord) -> Vec<ScheduleEntry> {
    let mut updated = schedule.to_vec();
    reconcile_in_place(&mut updated, record);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::generator::generate;
    use crate::schedule::reference::{test_definition, VaccineCatalog};
    use chrono::NaiveDate;

    fn schedule(member_id: Uuid) -> Vec<ScheduleEntry> {
        let catalog = VaccineCatalog::from_definitions(vec![
            test_definition("hepb", &[0, 1, 6]),
            test_definition("bcg", &[0]),
        ])
        .unwrap();
        let birth = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        generate(&catalog, member_id, birth, &["hepb", "bcg"])
            .unwrap()
            .entries
    }

    fn record(member_id: Uuid, vaccine_id: &str, dose: u32) -> CompletedRecord {
        CompletedRecord {
            id: Uuid::new_v4(),
            member_id,
            vaccine_id: vaccine_id.into(),
            vaccine_name: vaccine_id.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            location: "Clinic".into(),
            dose,
            lot_number: None,
            notes: None,
        }
    }

    #[test]
    fn flips_only_the_matching_dose() {
        let member = Uuid::new_v4();
        let before = schedule(member);
        let after = reconcile(&before, &record(member, "hepb", 1));

        let completed: Vec<_> = after
            .iter()
            .filter(|e| e.status == ScheduleStatus::Completed)
            .map(ScheduleEntry::dose_key)
            .collect();
        assert_eq!(completed, vec![("hepb", 1)]);
        assert_eq!(
            after.iter().filter(|e| e.is_upcoming()).count(),
            3,
            "the other three stay upcoming"
        );
    }

    #[test]
    fn reconcile_is_idempotent() {
        let member = Uuid::new_v4();
        let r = record(member, "hepb", 2);
        let once = reconcile(&schedule(member), &r);
        let twice = reconcile(&once, &r);
        assert_eq!(once, twice);
    }

    #[test]
    fn second_application_reports_already_completed() {
        let member = Uuid::new_v4();
        let mut entries = schedule(member);
        let r = record(member, "bcg", 1);
        let first = reconcile_in_place(&mut entries, &r);
        let second = reconcile_in_place(&mut entries, &r);
        assert!(matches!(first, Reconciliation::Fulfilled { was_completed: false, .. }));
        assert!(matches!(second, Reconciliation::Fulfilled { was_completed: true, .. }));
    }

    #[test]
    fn unmatched_dose_leaves_schedule_unchanged() {
        let member = Uuid::new_v4();
        let mut entries = schedule(member);
        let before = entries.clone();
        let outcome = reconcile_in_place(&mut entries, &record(member, "hepb", 4));
        assert_eq!(outcome, Reconciliation::Unmatched);
        assert_eq!(entries, before);
    }

    #[test]
    fn unmatched_vaccine_creates_nothing() {
        let member = Uuid::new_v4();
        let before = schedule(member);
        let after = reconcile(&before, &record(member, "mmr", 1));
        assert_eq!(after, before);
    }

    #[test]
    fn record_of_another_member_does_not_match() {
        let member = Uuid::new_v4();
        let before = schedule(member);
        let after = reconcile(&before, &record(Uuid::new_v4(), "hepb", 1));
        assert_eq!(after, before);
    }
}
