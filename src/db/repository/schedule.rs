use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{parse_date, parse_dose, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::ScheduleStatus;
use crate::models::ScheduleEntry;

struct ScheduleRow {
    id: String,
    member_id: String,
    vaccine_id: String,
    vaccine_name: String,
    due_date: String,
    dose: i64,
    status: String,
}

fn schedule_row_from_rusqlite(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduleRow> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        member_id: row.get(1)?,
        vaccine_id: row.get(2)?,
        vaccine_name: row.get(3)?,
        due_date: row.get(4)?,
        dose: row.get(5)?,
        status: row.get(6)?,
    })
}

fn schedule_entry_from_row(row: ScheduleRow) -> Result<ScheduleEntry, DatabaseError> {
    Ok(ScheduleEntry {
        id: parse_uuid("schedule_entries.id", &row.id)?,
        member_id: parse_uuid("schedule_entries.member_id", &row.member_id)?,
        vaccine_id: row.vaccine_id,
        vaccine_name: row.vaccine_name,
        due_date: parse_date("schedule_entries.due_date", &row.due_date)?,
        dose: parse_dose(row.dose)?,
        status: ScheduleStatus::from_str(&row.status)?,
    })
}

/// A member's schedule in stored order.
pub fn read_member_schedule(
    conn: &Connection,
    member_id: &Uuid,
) -> Result<Vec<ScheduleEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, member_id, vaccine_id, vaccine_name, due_date, dose, status
         FROM schedule_entries WHERE member_id = ?1
         ORDER BY position",
    )?;

    let rows = stmt.query_map(params![member_id.to_string()], schedule_row_from_rusqlite)?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(schedule_entry_from_row(row?)?);
    }
    Ok(entries)
}

/// Replace a member's whole schedule with `entries`, keeping their order.
///
/// Not atomic by itself: callers run it inside a transaction together with
/// the read it depends on.
pub fn write_member_schedule(
    conn: &Connection,
    member_id: &Uuid,
    entries: &[ScheduleEntry],
) -> Result<(), DatabaseError> {
    if let Some(stray) = entries.iter().find(|e| e.member_id != *member_id) {
        return Err(DatabaseError::ConstraintViolation(format!(
            "Schedule entry {} belongs to member {}, not {member_id}",
            stray.id, stray.member_id
        )));
    }

    conn.execute(
        "DELETE FROM schedule_entries WHERE member_id = ?1",
        params![member_id.to_string()],
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO schedule_entries (id, member_id, vaccine_id, vaccine_name, due_date,
         dose, status, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;

    for (position, entry) in entries.iter().enumerate() {
        stmt.execute(params![
            entry.id.to_string(),
            entry.member_id.to_string(),
            entry.vaccine_id,
            entry.vaccine_name,
            entry.due_date.to_string(),
            entry.dose,
            entry.status.as_str(),
            position as i64,
        ])
        .map_err(|e| constraint_error(e, member_id, entry))?;
    }

    Ok(())
}

/// Name the constraint an insert tripped; other failures pass through.
fn constraint_error(e: rusqlite::Error, member_id: &Uuid, entry: &ScheduleEntry) -> DatabaseError {
    let rusqlite::Error::SqliteFailure(err, _) = &e else {
        return DatabaseError::Sqlite(e);
    };
    let message = match err.extended_code {
        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => format!(
            "Duplicate dose {} of {} for member {member_id}",
            entry.dose, entry.vaccine_id
        ),
        rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            format!("Schedule entry id {} is already in use", entry.id)
        }
        rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
            format!("Unknown member {}", entry.member_id)
        }
        _ => return DatabaseError::Sqlite(e),
    };
    DatabaseError::ConstraintViolation(message)
}
