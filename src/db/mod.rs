pub mod sqlite;
pub mod repository;
pub mod snapshot;

pub use sqlite::*;
pub use repository::*;
pub use snapshot::{
    export_snapshot, import_snapshot, ImportSummary, Snapshot, SnapshotRecord, SnapshotScheduleEntry,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid stored value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Cannot create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
}
