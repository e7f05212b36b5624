//! Home dashboard endpoint.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext};
use crate::home::{self, HomeSummary};

/// `GET /api/members/:member_id/home`
pub async fn dashboard(
    State(ctx): State<ApiContext>,
    Path(member_id): Path<String>,
) -> Result<Json<HomeSummary>, ApiError> {
    let member_id = parse_id(&member_id, "member")?;
    let summary = ctx
        .with_db(move |core, conn| {
            Ok(home::home_summary(conn, core.catalog(), &member_id, core.today())?)
        })
        .await?;
    Ok(Json(summary))
}
