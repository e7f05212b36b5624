//! Home dashboard for one family member.
//!
//! Combines the member profile, their age, the projected schedule and the
//! latest recorded vaccinations into one read-only summary.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db;
use crate::error::ServiceError;
use crate::family::{member_age, MemberAge};
use crate::models::{CompletedRecord, FamilyMember, ScheduleEntry};
use crate::schedule::{project, VaccineCatalog};

const RECENT_RECORD_LIMIT: usize = 3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The "next vaccine" card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextVaccineCard {
    pub entry: ScheduleEntry,
    pub days_left: i64,
    pub is_overdue: bool,
    /// Catalog slug for linking to the knowledge base.
    pub slug: Option<String>,
    pub short_description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSummary {
    pub member: FamilyMember,
    pub age: MemberAge,
    pub age_display: String,
    pub next: Option<NextVaccineCard>,
    pub upcoming_count: u32,
    pub overdue_count: u32,
    pub completed_count: u32,
    /// Newest first.
    pub recent_records: Vec<CompletedRecord>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn home_summary(
    conn: &Connection,
    catalog: &VaccineCatalog,
    member_id: &Uuid,
    today: NaiveDate,
) -> Result<HomeSummary, ServiceError> {
    let member = db::get_member(conn, member_id)?.ok_or(ServiceError::MemberNotFound(*member_id))?;
    let schedule = db::read_member_schedule(conn, member_id)?;
    let projection = project(&schedule, today);

    let next = projection.next.clone().map(|entry| {
        let definition = catalog.get(&entry.vaccine_id);
        NextVaccineCard {
            days_left: projection.days_left,
            is_overdue: projection.is_overdue(&entry),
            slug: definition.map(|d| d.slug.clone()),
            short_description: definition.map(|d| d.short_description.clone()),
            entry,
        }
    });

    let mut recent_records = db::read_member_records(conn, member_id)?;
    // Stable sort keeps insertion order for same-day records; reversed for newest first.
    recent_records.reverse();
    recent_records.sort_by(|a, b| b.date.cmp(&a.date));
    recent_records.truncate(RECENT_RECORD_LIMIT);

    let age = member_age(member.birth_date, today);
    Ok(HomeSummary {
        age_display: age.display(),
        age,
        member,
        next,
        upcoming_count: projection.upcoming_count,
        overdue_count: projection.overdue_count,
        completed_count: projection.completed_count,
        recent_records,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::family::{create_member, NewMember};
    use crate::schedule::service::{plan_schedule, record_vaccination, NewRecord};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup() -> (Connection, VaccineCatalog, Uuid) {
        let mut conn = open_memory_database().unwrap();
        let member = create_member(
            &mut conn,
            &NewMember {
                name: "Mia".into(),
                birth_date: Some(date("2024-01-01")),
                avatar: None,
            },
            date("2024-01-01"),
        )
        .unwrap();
        (conn, VaccineCatalog::bundled().unwrap(), member.id)
    }

    fn record(vaccine_id: &str, dose: u32, on: &str) -> NewRecord {
        NewRecord {
            vaccine_id: vaccine_id.into(),
            date: Some(date(on)),
            location: "Clinic".into(),
            dose: Some(dose),
            ..Default::default()
        }
    }

    #[test]
    fn empty_schedule_has_no_next_card() {
        let (conn, catalog, member_id) = setup();
        let summary = home_summary(&conn, &catalog, &member_id, date("2024-03-15")).unwrap();
        assert!(summary.next.is_none());
        assert_eq!(summary.age_display, "2 months");
        assert_eq!(summary.upcoming_count, 0);
        assert!(summary.recent_records.is_empty());
    }

    #[test]
    fn next_card_skips_completed_doses() {
        let (mut conn, catalog, member_id) = setup();
        plan_schedule(&mut conn, &catalog, &member_id, &["hepb", "bcg"]).unwrap();
        record_vaccination(&mut conn, &catalog, &member_id, &record("hepb", 1, "2024-01-01")).unwrap();
        record_vaccination(&mut conn, &catalog, &member_id, &record("bcg", 1, "2024-01-02")).unwrap();

        let summary = home_summary(&conn, &catalog, &member_id, date("2024-01-20")).unwrap();
        let next = summary.next.unwrap();
        assert_eq!(next.entry.dose_key(), ("hepb", 2));
        assert_eq!(next.days_left, 12);
        assert!(!next.is_overdue);
        assert_eq!(next.slug.as_deref(), Some("hepatitis-b"));
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.upcoming_count, 2);
        assert_eq!(summary.recent_records[0].vaccine_id, "bcg");
    }

    #[test]
    fn overdue_next_card() {
        let (mut conn, catalog, member_id) = setup();
        plan_schedule(&mut conn, &catalog, &member_id, &["hepb"]).unwrap();

        let summary = home_summary(&conn, &catalog, &member_id, date("2024-03-01")).unwrap();
        let next = summary.next.unwrap();
        assert_eq!(next.entry.dose_key(), ("hepb", 1));
        assert!(next.is_overdue);
        assert_eq!(next.days_left, 0);
        assert_eq!(summary.overdue_count, 2);
    }

    #[test]
    fn recent_records_are_capped() {
        let (mut conn, catalog, member_id) = setup();
        for (dose, on) in [(1, "2024-03-01"), (2, "2024-04-01"), (3, "2024-05-01")] {
            record_vaccination(&mut conn, &catalog, &member_id, &record("opv", dose, on)).unwrap();
        }
        record_vaccination(&mut conn, &catalog, &member_id, &record("bcg", 1, "2024-01-02")).unwrap();

        let summary = home_summary(&conn, &catalog, &member_id, date("2024-06-01")).unwrap();
        let doses: Vec<_> = summary.recent_records.iter().map(|r| r.dose).collect();
        assert_eq!(doses, vec![3, 2, 1]);
    }

    #[test]
    fn unknown_member() {
        let (conn, catalog, _) = setup();
        assert!(matches!(
            home_summary(&conn, &catalog, &Uuid::new_v4(), date("2024-01-01")),
            Err(ServiceError::MemberNotFound(_))
        ));
    }
}
