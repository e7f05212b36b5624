//! Vaccination record endpoints.
//!
//! - `GET /api/members/:member_id/records`: records in insertion order
//! - `POST /api/members/:member_id/records`: record a vaccination

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext};
use crate::db;
use crate::models::CompletedRecord;
use crate::schedule::service::{self, NewRecord};
use crate::schedule::Reconciliation;

#[derive(Serialize)]
pub struct RecordsResponse {
    pub records: Vec<CompletedRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCreatedResponse {
    pub record: CompletedRecord,
    /// Schedule entry this record completed, if any.
    pub matched_entry_id: Option<Uuid>,
}

/// `GET /api/members/:member_id/records`
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(member_id): Path<String>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let member_id = parse_id(&member_id, "member")?;
    let records = ctx
        .with_db(move |_, conn| {
            if db::get_member(conn, &member_id)?.is_none() {
                return Err(ApiError::NotFound(format!(
                    "Family member not found: {member_id}"
                )));
            }
            Ok(db::read_member_records(conn, &member_id)?)
        })
        .await?;
    Ok(Json(RecordsResponse { records }))
}

/// `POST /api/members/:member_id/records`: 201 with the stored record.
pub async fn create(
    State(ctx): State<ApiContext>,
    Path(member_id): Path<String>,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordCreatedResponse>), ApiError> {
    let member_id = parse_id(&member_id, "member")?;
    let Json(input) = payload?;

    let outcome = ctx
        .with_db(move |core, conn| {
            Ok(service::record_vaccination(conn, core.catalog(), &member_id, &input)?)
        })
        .await?;

    let matched_entry_id = match outcome.reconciliation {
        Reconciliation::Fulfilled { entry_id, .. } => Some(entry_id),
        Reconciliation::Unmatched => None,
    };
    Ok((
        StatusCode::CREATED,
        Json(RecordCreatedResponse {
            record: outcome.record,
            matched_entry_id,
        }),
    ))
}
