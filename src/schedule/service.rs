//! Storage-backed schedule flows.
//!
//! Each read-modify-write runs in one `BEGIN IMMEDIATE` transaction, so two
//! writers touching the same member's schedule serialize on the database
//! lock instead of overwriting each other's changes.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::generator::generate;
use super::merge::merge;
use super::projection::{days_until, is_overdue};
use super::reconcile::{reconcile_in_place, Reconciliation};
use super::reference::{VaccineCatalog, VaccineDefinition};
use crate::db::{
    append_member_record, get_member, read_member_schedule, write_member_schedule,
};
use crate::error::ServiceError;
use crate::models::{CompletedRecord, ScheduleEntry};

/// Result of [`plan_schedule`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSchedule {
    /// Stored schedule after the merge, in stored order.
    pub schedules: Vec<ScheduleEntry>,
    /// How many entries the merge added.
    pub added: usize,
    pub unknown_vaccine_ids: Vec<String>,
}

/// Generate entries for `vaccine_ids` from the member's birth date and merge
/// them into the stored schedule.
pub fn plan_schedule<S: AsRef<str>>(
    conn: &mut Connection,
    catalog: &VaccineCatalog,
    member_id: &Uuid,
    vaccine_ids: &[S],
) -> Result<PlannedSchedule, ServiceError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let member = get_member(&tx, member_id)?.ok_or(ServiceError::MemberNotFound(*member_id))?;
    let existing = read_member_schedule(&tx, member_id)?;
    let before = existing.len();

    let generated = generate(catalog, member.id, member.birth_date, vaccine_ids)?;
    let merged = merge(existing, generated.entries);
    write_member_schedule(&tx, member_id, &merged)?;
    tx.commit()?;

    let added = merged.len() - before;
    tracing::info!(%member_id, added, total = merged.len(), "Schedule planned");

    Ok(PlannedSchedule {
        schedules: merged,
        added,
        unknown_vaccine_ids: generated.unknown_vaccine_ids,
    })
}

/// Input for recording a vaccination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    #[serde(default)]
    pub vaccine_id: String,
    #[serde(default)]
    pub vaccine_name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    /// Defaults to 1.
    #[serde(default)]
    pub dose: Option<u32>,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Result of [`record_vaccination`].
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub record: CompletedRecord,
    pub reconciliation: Reconciliation,
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validate and store a completed vaccination, then mark the matching
/// schedule entry completed. A record with no matching entry is stored
/// as-is; it never creates a schedule entry.
pub fn record_vaccination(
    conn: &mut Connection,
    catalog: &VaccineCatalog,
    member_id: &Uuid,
    input: &NewRecord,
) -> Result<RecordOutcome, ServiceError> {
    let vaccine_id = input.vaccine_id.trim();
    if vaccine_id.is_empty() {
        return Err(ServiceError::Validation("vaccineId is required".into()));
    }
    let location = input.location.trim();
    if location.is_empty() {
        return Err(ServiceError::Validation("location is required".into()));
    }
    let date = input
        .date
        .ok_or_else(|| ServiceError::Validation("date is required".into()))?;
    let dose = input.dose.unwrap_or(1);
    if dose == 0 {
        return Err(ServiceError::Validation("dose must be 1 or greater".into()));
    }

    let vaccine_name = non_blank(&input.vaccine_name)
        .or_else(|| catalog.get(vaccine_id).map(|d| d.name.clone()))
        .unwrap_or_else(|| vaccine_id.to_string());

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    get_member(&tx, member_id)?.ok_or(ServiceError::MemberNotFound(*member_id))?;

    let record = CompletedRecord {
        id: Uuid::new_v4(),
        member_id: *member_id,
        vaccine_id: vaccine_id.to_string(),
        vaccine_name,
        date,
        location: location.to_string(),
        dose,
        lot_number: non_blank(&input.lot_number),
        notes: non_blank(&input.notes),
    };
    append_member_record(&tx, &record)?;

    let mut schedule = read_member_schedule(&tx, member_id)?;
    let reconciliation = reconcile_in_place(&mut schedule, &record);
    if matches!(reconciliation, Reconciliation::Fulfilled { was_completed: false, .. }) {
        write_member_schedule(&tx, member_id, &schedule)?;
    }
    tx.commit()?;

    tracing::info!(
        %member_id,
        record_id = %record.id,
        vaccine_id = %record.vaccine_id,
        dose = record.dose,
        matched = !matches!(reconciliation, Reconciliation::Unmatched),
        "Vaccination recorded"
    );

    Ok(RecordOutcome {
        record,
        reconciliation,
    })
}

/// One schedule entry with its reference data and countdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryDetail {
    pub entry: ScheduleEntry,
    pub vaccine: Option<VaccineDefinition>,
    pub days_left: i64,
    pub is_overdue: bool,
}

pub fn schedule_entry_detail(
    conn: &Connection,
    catalog: &VaccineCatalog,
    member_id: &Uuid,
    entry_id: &Uuid,
    today: NaiveDate,
) -> Result<ScheduleEntryDetail, ServiceError> {
    get_member(conn, member_id)?.ok_or(ServiceError::MemberNotFound(*member_id))?;
    let entry = read_member_schedule(conn, member_id)?
        .into_iter()
        .find(|e| e.id == *entry_id)
        .ok_or(ServiceError::EntryNotFound(*entry_id))?;

    Ok(ScheduleEntryDetail {
        vaccine: catalog.get(&entry.vaccine_id).cloned(),
        days_left: days_until(entry.due_date, today),
        is_overdue: is_overdue(&entry, today),
        entry,
    })
}
