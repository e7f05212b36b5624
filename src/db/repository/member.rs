use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{parse_date, parse_uuid};
use crate::db::DatabaseError;
use crate::models::FamilyMember;

struct MemberRow {
    id: String,
    name: String,
    birth_date: String,
    avatar: Option<String>,
}

fn member_row_from_rusqlite(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemberRow> {
    Ok(MemberRow {
        id: row.get(0)?,
        name: row.get(1)?,
        birth_date: row.get(2)?,
        avatar: row.get(3)?,
    })
}

fn member_from_row(row: MemberRow) -> Result<FamilyMember, DatabaseError> {
    Ok(FamilyMember {
        id: parse_uuid("members.id", &row.id)?,
        name: row.name,
        birth_date: parse_date("members.birth_date", &row.birth_date)?,
        avatar: row.avatar,
    })
}

pub fn insert_member(conn: &Connection, member: &FamilyMember) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO members (id, name, birth_date, avatar) VALUES (?1, ?2, ?3, ?4)",
        params![
            member.id.to_string(),
            member.name,
            member.birth_date.to_string(),
            member.avatar,
        ],
    )?;
    Ok(())
}

/// Insert or overwrite a member's profile fields, keeping its schedule and records.
pub fn upsert_member(conn: &Connection, member: &FamilyMember) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO members (id, name, birth_date, avatar) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            birth_date = excluded.birth_date,
            avatar = excluded.avatar",
        params![
            member.id.to_string(),
            member.name,
            member.birth_date.to_string(),
            member.avatar,
        ],
    )?;
    Ok(())
}

pub fn get_member(conn: &Connection, id: &Uuid) -> Result<Option<FamilyMember>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, birth_date, avatar FROM members WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], member_row_from_rusqlite);

    match result {
        Ok(row) => Ok(Some(member_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All members in creation order.
pub fn list_members(conn: &Connection) -> Result<Vec<FamilyMember>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, birth_date, avatar FROM members ORDER BY rowid",
    )?;

    let rows = stmt.query_map([], member_row_from_rusqlite)?;

    let mut members = Vec::new();
    for row in rows {
        members.push(member_from_row(row?)?);
    }
    Ok(members)
}

pub fn count_members(conn: &Connection) -> Result<u32, DatabaseError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))?;
    Ok(count as u32)
}
