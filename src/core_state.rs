//! Application state shared by every request handler and CLI command.
//!
//! Holds the immutable vaccine catalog, the database location and the
//! clinic provider. Connections are opened per operation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::clinics::{AmapClinics, BundledClinics, ClinicError, ClinicLocator};
use crate::config;
use crate::db;
use crate::schedule::{load_vaccine_definitions, ReferenceError, VaccineCatalog};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    db_path: PathBuf,
    catalog: VaccineCatalog,
    clinics: Arc<dyn ClinicLocator>,
}

impl CoreState {
    pub fn new(db_path: PathBuf, catalog: VaccineCatalog, clinics: Arc<dyn ClinicLocator>) -> Self {
        Self {
            db_path,
            catalog,
            clinics,
        }
    }

    /// Build state for the database at `db_path` with the bundled catalog,
    /// using AMap search when a key is configured.
    pub fn from_config(db_path: PathBuf) -> Result<Self, CoreError> {
        let catalog = load_vaccine_definitions()?;
        let clinics: Arc<dyn ClinicLocator> = match config::amap_key() {
            Some(key) => Arc::new(AmapClinics::new(&key, config::CLINIC_SEARCH_TIMEOUT_SECS)?),
            None => Arc::new(BundledClinics::new()),
        };
        tracing::info!(
            vaccines = catalog.len(),
            clinic_provider = clinics.provider_name(),
            db = %db_path.display(),
            "Core state ready"
        );
        Ok(Self::new(db_path, catalog, clinics))
    }

    /// Create the database and apply migrations. Run once at startup so
    /// schema problems surface before the first request.
    pub fn initialize(&self) -> Result<(), CoreError> {
        self.open_db()?;
        Ok(())
    }

    /// Open a connection with migrations applied.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn catalog(&self) -> &VaccineCatalog {
        &self.catalog
    }

    pub fn clinics(&self) -> Arc<dyn ClinicLocator> {
        Arc::clone(&self.clinics)
    }

    /// Local calendar date used for countdowns and age.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    // ── Snapshot files ──────────────────────────────────────

    /// Write the whole database as a pretty-printed JSON snapshot.
    pub fn export_snapshot_to(&self, path: &Path) -> Result<db::Snapshot, CoreError> {
        let conn = self.open_db()?;
        let snapshot = db::export_snapshot(&conn)?;
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), members = snapshot.members.len(), "Snapshot exported");
        Ok(snapshot)
    }

    /// Merge a JSON snapshot file into the database.
    pub fn import_snapshot_from(&self, path: &Path) -> Result<db::ImportSummary, CoreError> {
        let json = std::fs::read_to_string(path)?;
        let snapshot: db::Snapshot = serde_json::from_str(&json)?;
        let mut conn = self.open_db()?;
        Ok(db::import_snapshot(&mut conn, &self.catalog, &snapshot)?)
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Vaccine reference data error: {0}")]
    Reference(#[from] ReferenceError),
    #[error("Clinic provider error: {0}")]
    Clinic(#[from] ClinicError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// State over a database in `dir` with the bundled catalog and clinics.
#[cfg(test)]
pub(crate) fn test_state(dir: &Path) -> CoreState {
    CoreState::new(
        dir.join("test.db"),
        VaccineCatalog::bundled().unwrap(),
        Arc::new(BundledClinics::new()),
    )
}
