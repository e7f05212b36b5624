//! Reminder feed endpoint.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext};
use crate::db;
use crate::schedule::reminders::{DEFAULT_REMINDER_WINDOW_DAYS, MAX_REMINDER_WINDOW_DAYS};
use crate::schedule::{project, reminders, Reminder};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemindersQuery {
    pub within_days: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemindersResponse {
    pub today: NaiveDate,
    pub within_days: i64,
    pub reminders: Vec<Reminder>,
}

/// `GET /api/members/:member_id/reminders?withinDays=7`
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(member_id): Path<String>,
    query: Result<Query<RemindersQuery>, QueryRejection>,
) -> Result<Json<RemindersResponse>, ApiError> {
    let member_id = parse_id(&member_id, "member")?;
    let Query(query) = query?;
    let within_days = query.within_days.unwrap_or(DEFAULT_REMINDER_WINDOW_DAYS);
    if !(0..=MAX_REMINDER_WINDOW_DAYS).contains(&within_days) {
        return Err(ApiError::BadRequest(format!(
            "withinDays must be between 0 and {MAX_REMINDER_WINDOW_DAYS}"
        )));
    }

    let response = ctx
        .with_db(move |core, conn| {
            if db::get_member(conn, &member_id)?.is_none() {
                return Err(ApiError::NotFound(format!(
                    "Family member not found: {member_id}"
                )));
            }
            let schedule = db::read_member_schedule(conn, &member_id)?;
            let projection = project(&schedule, core.today());
            Ok(RemindersResponse {
                today: projection.today,
                within_days,
                reminders: reminders(&projection, within_days),
            })
        })
        .await?;
    Ok(Json(response))
}
