//! Family member management and age display.

use chrono::{Datelike, NaiveDate};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::ServiceError;
use crate::models::FamilyMember;

const AVATAR_COUNT: u32 = 5;

/// Input for adding a family member.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Avatars rotate through a fixed set by how many members already exist.
pub fn default_avatar(existing_members: u32) -> String {
    format!("/avatars/child{}.png", existing_members % AVATAR_COUNT + 1)
}

pub fn create_member(
    conn: &mut Connection,
    input: &NewMember,
    today: NaiveDate,
) -> Result<FamilyMember, ServiceError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("name is required".into()));
    }
    let birth_date = input
        .birth_date
        .ok_or_else(|| ServiceError::Validation("birthDate is required".into()))?;
    if birth_date > today {
        return Err(ServiceError::Validation(format!(
            "birthDate {birth_date} is in the future"
        )));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let avatar = match input.avatar.as_deref().map(str::trim) {
        Some(a) if !a.is_empty() => a.to_string(),
        _ => default_avatar(db::count_members(&tx)?),
    };
    let member = FamilyMember {
        id: Uuid::new_v4(),
        name: name.to_string(),
        birth_date,
        avatar: Some(avatar),
    };
    db::insert_member(&tx, &member)?;
    tx.commit()?;

    tracing::info!(member_id = %member.id, "Family member added");
    Ok(member)
}

pub fn list_members(conn: &Connection) -> Result<Vec<FamilyMember>, ServiceError> {
    Ok(db::list_members(conn)?)
}

/// Completed calendar age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAge {
    pub years: u32,
    /// Months past the last full year.
    pub months: u32,
    /// Total days since birth.
    pub days: u32,
}

impl MemberAge {
    /// "12 days" under a month, "5 months" under a year, otherwise
    /// "2 years 3 months" (or "2 years" on a whole year).
    pub fn display(&self) -> String {
        if self.years == 0 && self.months == 0 {
            plural(self.days, "day")
        } else if self.years == 0 {
            plural(self.months, "month")
        } else if self.months == 0 {
            plural(self.years, "year")
        } else {
            format!("{} {}", plural(self.years, "year"), plural(self.months, "month"))
        }
    }
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Age on `today`. A birth date after `today` reads as zero.
pub fn member_age(birth_date: NaiveDate, today: NaiveDate) -> MemberAge {
    if birth_date > today {
        return MemberAge {
            years: 0,
            months: 0,
            days: 0,
        };
    }

    let mut total_months = (today.year() - birth_date.year()) * 12
        + today.month() as i32
        - birth_date.month() as i32;
    if today.day() < birth_date.day() {
        total_months -= 1;
    }
    let total_months = total_months.max(0) as u32;

    MemberAge {
        years: total_months / 12,
        months: total_months % 12,
        days: (today - birth_date).num_days() as u32,
    }
}
