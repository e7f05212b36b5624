//! Repository layer: entity-scoped database operations.
//!
//! Dates are stored as `YYYY-MM-DD` text and ids as hyphenated UUID text.
//! All public functions are re-exported here.

mod member;
mod record;
mod schedule;

use chrono::NaiveDate;
use uuid::Uuid;

use super::DatabaseError;

pub use member::*;
pub use record::*;
pub use schedule::*;

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|_| DatabaseError::InvalidValue {
        field: field.into(),
        value: value.into(),
    })
}

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DatabaseError::InvalidValue {
        field: field.into(),
        value: value.into(),
    })
}

pub(crate) fn parse_dose(value: i64) -> Result<u32, DatabaseError> {
    u32::try_from(value)
        .ok()
        .filter(|d| *d >= 1)
        .ok_or_else(|| DatabaseError::InvalidValue {
            field: "dose".into(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_days() {
        let d = parse_date("due_date", "2024-02-29").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn parse_date_rejects_garbage() {
        let err = parse_date("due_date", "29/02/2024").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidValue { ref field, .. } if field == "due_date"));
    }

    #[test]
    fn parse_dose_rejects_zero() {
        assert!(parse_dose(0).is_err());
        assert_eq!(parse_dose(3).unwrap(), 3);
    }
}
