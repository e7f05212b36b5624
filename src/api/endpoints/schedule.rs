//! Schedule endpoints.
//!
//! - `GET /api/members/:member_id/schedule`: projected schedule with countdown
//! - `POST /api/members/:member_id/schedule`: generate and merge doses
//! - `GET /api/members/:member_id/schedule/:entry_id`: one entry in detail

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, PlanScheduleRequest};
use crate::db;
use crate::schedule::service::{self, PlannedSchedule, ScheduleEntryDetail};
use crate::schedule::{project, ScheduleProjection};

/// `GET /api/members/:member_id/schedule`
pub async fn get_schedule(
    State(ctx): State<ApiContext>,
    Path(member_id): Path<String>,
) -> Result<Json<ScheduleProjection>, ApiError> {
    let member_id = parse_id(&member_id, "member")?;
    let projection = ctx
        .with_db(move |core, conn| {
            if db::get_member(conn, &member_id)?.is_none() {
                return Err(ApiError::NotFound(format!(
                    "Family member not found: {member_id}"
                )));
            }
            let schedule = db::read_member_schedule(conn, &member_id)?;
            Ok(project(&schedule, core.today()))
        })
        .await?;
    Ok(Json(projection))
}

/// `POST /api/members/:member_id/schedule` with `{ "selectedVaccines": [...] }`
pub async fn plan(
    State(ctx): State<ApiContext>,
    Path(member_id): Path<String>,
    payload: Result<Json<PlanScheduleRequest>, JsonRejection>,
) -> Result<Json<PlannedSchedule>, ApiError> {
    let member_id = parse_id(&member_id, "member")?;
    let Json(request) = payload?;

    let planned = ctx
        .with_db(move |core, conn| {
            Ok(service::plan_schedule(
                conn,
                core.catalog(),
                &member_id,
                &request.selected_vaccines,
            )?)
        })
        .await?;
    Ok(Json(planned))
}

/// `GET /api/members/:member_id/schedule/:entry_id`
pub async fn entry_detail(
    State(ctx): State<ApiContext>,
    Path((member_id, entry_id)): Path<(String, String)>,
) -> Result<Json<ScheduleEntryDetail>, ApiError> {
    let member_id = parse_id(&member_id, "member")?;
    let entry_id = parse_id(&entry_id, "schedule entry")?;

    let detail = ctx
        .with_db(move |core, conn| {
            Ok(service::schedule_entry_detail(
                conn,
                core.catalog(),
                &member_id,
                &entry_id,
                core.today(),
            )?)
        })
        .await?;
    Ok(Json(detail))
}
