//! Shared types for the API layer.

use std::sync::Arc;

use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use crate::core_state::CoreState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Run `f` on the blocking pool with a fresh connection.
    ///
    /// A locked database makes SQLite wait up to the busy timeout, which
    /// must not hold a runtime worker.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&CoreState, &mut Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let core = Arc::clone(&self.core);
        tokio::task::spawn_blocking(move || {
            let mut conn = core.open_db()?;
            f(&*core, &mut conn)
        })
        .await?
    }
}

/// Body of `POST /members/:member_id/schedule`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanScheduleRequest {
    #[serde(default)]
    pub selected_vaccines: Vec<String>,
}

/// Path ids arrive as strings so malformed ids get our 400 body.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {what} id: {raw}")))
}
