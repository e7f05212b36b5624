//! Immunization schedule core.
//!
//! Pure functions that turn a birth date and a vaccine selection into dated
//! dose entries, fold new entries into an existing schedule, flip entries to
//! completed as vaccinations are recorded, and derive the ordered countdown
//! view and the reminder feed. `service` wires them to storage.
//!
//! Data flow: generate → merge → (persist) → reconcile → project.

pub mod generator;
pub mod merge;
pub mod projection;
pub mod reconcile;
pub mod reference;
pub mod reminders;
pub mod service;

pub use generator::{due_date_for, generate, GeneratedSchedule};
pub use merge::merge;
pub use projection::{days_until, is_overdue, project, ScheduleProjection};
pub use reconcile::{reconcile, reconcile_in_place, Reconciliation};
pub use reminders::{reminders, Reminder, ReminderKind};
pub use reference::{load_vaccine_definitions, VaccineCatalog, VaccineContent, VaccineDefinition};

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Due date out of range: {birth_date} + {offset_months} months")]
    DateOutOfRange {
        birth_date: NaiveDate,
        offset_months: u32,
    },
}

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Failed to parse vaccine reference data: {0}")]
    Parse(String),
    #[error("Duplicate vaccine {field} in reference data: {value}")]
    Duplicate { field: &'static str, value: String },
    #[error("Vaccine {0} has no doses")]
    NoDoses(String),
    #[error("Vaccine {0} has age offsets out of order")]
    OffsetsOutOfOrder(String),
}
