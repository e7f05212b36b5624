//! Knowledge base endpoints.
//!
//! - `GET /api/knowledge-base?q=&category=`: filtered list
//! - `GET /api/knowledge-base/:slug`: full article

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::knowledge::{self, KnowledgeQuery, KnowledgeSummary};
use crate::schedule::VaccineDefinition;

#[derive(Serialize)]
pub struct KnowledgeListResponse {
    pub vaccines: Vec<KnowledgeSummary>,
}

/// `GET /api/knowledge-base`
pub async fn list(
    State(ctx): State<ApiContext>,
    query: Result<Query<KnowledgeQuery>, QueryRejection>,
) -> Result<Json<KnowledgeListResponse>, ApiError> {
    let Query(query) = query?;
    let vaccines = knowledge::list(ctx.core.catalog(), &query);
    Ok(Json(KnowledgeListResponse { vaccines }))
}

/// `GET /api/knowledge-base/:slug`
pub async fn article(
    State(ctx): State<ApiContext>,
    Path(slug): Path<String>,
) -> Result<Json<VaccineDefinition>, ApiError> {
    knowledge::get_by_slug(ctx.core.catalog(), &slug)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No vaccine article: {slug}")))
}
