//! Errors raised by the member, schedule and record flows.

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Family member not found: {0}")]
    MemberNotFound(Uuid),

    #[error("Schedule entry not found: {0}")]
    EntryNotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlite(err))
    }
}
