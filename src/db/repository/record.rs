use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{parse_date, parse_dose, parse_uuid};
use crate::db::DatabaseError;
use crate::models::CompletedRecord;

struct RecordRow {
    id: String,
    member_id: String,
    vaccine_id: String,
    vaccine_name: String,
    date: String,
    location: String,
    dose: i64,
    lot_number: Option<String>,
    notes: Option<String>,
}

fn record_row_from_rusqlite(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: row.get(0)?,
        member_id: row.get(1)?,
        vaccine_id: row.get(2)?,
        vaccine_name: row.get(3)?,
        date: row.get(4)?,
        location: row.get(5)?,
        dose: row.get(6)?,
        lot_number: row.get(7)?,
        notes: row.get(8)?,
    })
}

fn record_from_row(row: RecordRow) -> Result<CompletedRecord, DatabaseError> {
    Ok(CompletedRecord {
        id: parse_uuid("vaccination_records.id", &row.id)?,
        member_id: parse_uuid("vaccination_records.member_id", &row.member_id)?,
        vaccine_id: row.vaccine_id,
        vaccine_name: row.vaccine_name,
        date: parse_date("vaccination_records.date", &row.date)?,
        location: row.location,
        dose: parse_dose(row.dose)?,
        lot_number: row.lot_number,
        notes: row.notes,
    })
}

/// A member's completed vaccinations in the order they were recorded.
pub fn read_member_records(
    conn: &Connection,
    member_id: &Uuid,
) -> Result<Vec<CompletedRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, member_id, vaccine_id, vaccine_name, date, location, dose, lot_number, notes
         FROM vaccination_records WHERE member_id = ?1
         ORDER BY rowid",
    )?;

    let rows = stmt.query_map(params![member_id.to_string()], record_row_from_rusqlite)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(record_from_row(row?)?);
    }
    Ok(records)
}

pub fn append_member_record(
    conn: &Connection,
    record: &CompletedRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO vaccination_records (id, member_id, vaccine_id, vaccine_name, date,
         location, dose, lot_number, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id.to_string(),
            record.member_id.to_string(),
            record.vaccine_id,
            record.vaccine_name,
            record.date.to_string(),
            record.location,
            record.dose,
            record.lot_number,
            record.notes,
        ],
    )?;
    Ok(())
}

/// Whether a record with this id is already stored (used by snapshot import).
pub fn record_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM vaccination_records WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists)
}
