//! Whole-database JSON snapshot for backup and seeding.
//!
//! Document shape:
//! `{ members: [...], schedules: { memberId: [...] }, records: { memberId: [...] } }`
//! with camelCase keys and `YYYY-MM-DD` dates.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repository::{
    append_member_record, list_members, read_member_records, read_member_schedule,
    record_exists, upsert_member, write_member_schedule,
};
use super::DatabaseError;
use crate::models::enums::ScheduleStatus;
use crate::models::{CompletedRecord, FamilyMember, ScheduleEntry};
use crate::schedule::service::non_blank;
use crate::schedule::{merge, reconcile_in_place, VaccineCatalog};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub members: Vec<FamilyMember>,
    #[serde(default)]
    pub schedules: BTreeMap<Uuid, Vec<SnapshotScheduleEntry>>,
    #[serde(default)]
    pub records: BTreeMap<Uuid, Vec<SnapshotRecord>>,
}

/// Status as written in snapshots. Older documents may carry `overdue`,
/// which is derived at read time here and imports as upcoming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Upcoming,
    Completed,
    Overdue,
}

/// Schedule entry as stored in a document. Older documents key entries by
/// member and omit `memberId`; the map key fills it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotScheduleEntry {
    pub id: Uuid,
    #[serde(default)]
    pub member_id: Option<Uuid>,
    pub vaccine_id: String,
    #[serde(default)]
    pub vaccine_name: Option<String>,
    pub due_date: NaiveDate,
    pub dose: u32,
    pub status: SnapshotStatus,
}

/// Completed record as stored in a document. `memberId` and `vaccineName`
/// may be absent, and `lotNumber`/`notes` may be empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub id: Uuid,
    #[serde(default)]
    pub member_id: Option<Uuid>,
    pub vaccine_id: String,
    #[serde(default)]
    pub vaccine_name: Option<String>,
    pub date: NaiveDate,
    pub location: String,
    #[serde(default = "first_dose")]
    pub dose: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn first_dose() -> u32 {
    1
}

fn vaccine_name_or_default(
    catalog: &VaccineCatalog,
    vaccine_id: &str,
    name: &Option<String>,
) -> String {
    non_blank(name)
        .or_else(|| catalog.get(vaccine_id).map(|d| d.name.clone()))
        .unwrap_or_else(|| vaccine_id.to_string())
}

fn owner_of(
    kind: &str,
    id: &Uuid,
    member_id: Option<Uuid>,
    key: &Uuid,
) -> Result<Uuid, DatabaseError> {
    match member_id {
        Some(owner) if owner != *key => Err(DatabaseError::ConstraintViolation(format!(
            "{kind} {id} belongs to member {owner}, not {key}"
        ))),
        _ => Ok(*key),
    }
}

fn positive_dose(field: &str, dose: u32) -> Result<u32, DatabaseError> {
    if dose == 0 {
        return Err(DatabaseError::InvalidValue {
            field: field.into(),
            value: "0".into(),
        });
    }
    Ok(dose)
}

impl From<ScheduleEntry> for SnapshotScheduleEntry {
    fn from(entry: ScheduleEntry) -> Self {
        Self {
            id: entry.id,
            member_id: Some(entry.member_id),
            vaccine_id: entry.vaccine_id,
            vaccine_name: Some(entry.vaccine_name),
            due_date: entry.due_date,
            dose: entry.dose,
            status: match entry.status {
                ScheduleStatus::Upcoming => SnapshotStatus::Upcoming,
                ScheduleStatus::Completed => SnapshotStatus::Completed,
            },
        }
    }
}

impl SnapshotScheduleEntry {
    fn to_entry(&self, key: &Uuid, catalog: &VaccineCatalog) -> Result<ScheduleEntry, DatabaseError> {
        Ok(ScheduleEntry {
            id: self.id,
            member_id: owner_of("Schedule entry", &self.id, self.member_id, key)?,
            vaccine_id: self.vaccine_id.clone(),
            vaccine_name: vaccine_name_or_default(catalog, &self.vaccine_id, &self.vaccine_name),
            due_date: self.due_date,
            dose: positive_dose("schedules.dose", self.dose)?,
            status: match self.status {
                SnapshotStatus::Completed => ScheduleStatus::Completed,
                SnapshotStatus::Upcoming | SnapshotStatus::Overdue => ScheduleStatus::Upcoming,
            },
        })
    }
}

impl From<CompletedRecord> for SnapshotRecord {
    fn from(record: CompletedRecord) -> Self {
        Self {
            id: record.id,
            member_id: Some(record.member_id),
            vaccine_id: record.vaccine_id,
            vaccine_name: Some(record.vaccine_name),
            date: record.date,
            location: record.location,
            dose: record.dose,
            lot_number: record.lot_number,
            notes: record.notes,
        }
    }
}

impl SnapshotRecord {
    fn to_record(&self, key: &Uuid, catalog: &VaccineCatalog) -> Result<CompletedRecord, DatabaseError> {
        Ok(CompletedRecord {
            id: self.id,
            member_id: owner_of("Record", &self.id, self.member_id, key)?,
            vaccine_id: self.vaccine_id.clone(),
            vaccine_name: vaccine_name_or_default(catalog, &self.vaccine_id, &self.vaccine_name),
            date: self.date,
            location: self.location.clone(),
            dose: positive_dose("records.dose", self.dose)?,
            lot_number: non_blank(&self.lot_number),
            notes: non_blank(&self.notes),
        })
    }
}

/// What an import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub members: usize,
    pub schedule_entries_added: usize,
    pub records_added: usize,
    pub records_skipped: usize,
}

pub fn export_snapshot(conn: &Connection) -> Result<Snapshot, DatabaseError> {
    let members = list_members(conn)?;
    let mut schedules = BTreeMap::new();
    let mut records = BTreeMap::new();

    for member in &members {
        let entries = read_member_schedule(conn, &member.id)?;
        schedules.insert(
            member.id,
            entries.into_iter().map(SnapshotScheduleEntry::from).collect(),
        );
        records.insert(
            member.id,
            read_member_records(conn, &member.id)?
                .into_iter()
                .map(SnapshotRecord::from)
                .collect(),
        );
    }

    Ok(Snapshot {
        members,
        schedules,
        records,
    })
}

/// Load a snapshot into the database in one transaction.
///
/// Members are upserted. Schedule entries are merged into what is stored, so
/// a dose already present is kept as-is. Records whose id already exists are
/// skipped; new ones are appended and reconciled against the schedule.
/// Missing vaccine names fall back to the catalog name, then the id.
pub fn import_snapshot(
    conn: &mut Connection,
    catalog: &VaccineCatalog,
    snapshot: &Snapshot,
) -> Result<ImportSummary, DatabaseError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut summary = ImportSummary::default();

    for member in &snapshot.members {
        upsert_member(&tx, member)?;
        summary.members += 1;
    }

    let member_ids: BTreeSet<&Uuid> = snapshot
        .schedules
        .keys()
        .chain(snapshot.records.keys())
        .collect();

    for member_id in member_ids {
        let existing = read_member_schedule(&tx, member_id)?;
        let before = existing.len();

        let incoming = snapshot
            .schedules
            .get(member_id)
            .into_iter()
            .flatten()
            .map(|entry| entry.to_entry(member_id, catalog))
            .collect::<Result<Vec<_>, _>>()?;
        let mut schedule = merge(existing, incoming);
        summary.schedule_entries_added += schedule.len() - before;

        for stored in snapshot.records.get(member_id).into_iter().flatten() {
            let record = stored.to_record(member_id, catalog)?;
            if record_exists(&tx, &record.id)? {
                summary.records_skipped += 1;
                continue;
            }
            append_member_record(&tx, &record)?;
            reconcile_in_place(&mut schedule, &record);
            summary.records_added += 1;
        }

        write_member_schedule(&tx, member_id, &schedule)?;
    }

    tx.commit()?;
    tracing::info!(
        members = summary.members,
        entries_added = summary.schedule_entries_added,
        records_added = summary.records_added,
        records_skipped = summary.records_skipped,
        "Snapshot imported"
    );
    Ok(summary)
}
