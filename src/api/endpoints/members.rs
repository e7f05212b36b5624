//! Family member endpoints.
//!
//! - `GET /api/members`: all members in creation order
//! - `POST /api/members`: add a member

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::family::{self, NewMember};
use crate::models::FamilyMember;

#[derive(Serialize)]
pub struct MembersResponse {
    pub members: Vec<FamilyMember>,
}

/// `GET /api/members`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<MembersResponse>, ApiError> {
    let members = ctx
        .with_db(|_, conn| Ok(family::list_members(conn)?))
        .await?;
    Ok(Json(MembersResponse { members }))
}

/// `POST /api/members`: 201 with the stored member.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<NewMember>, JsonRejection>,
) -> Result<(StatusCode, Json<FamilyMember>), ApiError> {
    let Json(input) = payload?;
    let member = ctx
        .with_db(move |core, conn| Ok(family::create_member(conn, &input, core.today())?))
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}
