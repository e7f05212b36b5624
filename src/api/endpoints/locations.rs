//! Nearby clinic search endpoint.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::clinics::{Clinic, ClinicQuery, GeoPoint};

#[derive(Deserialize)]
pub struct LocationsQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub keyword: Option<String>,
    pub radius: Option<u32>,
}

#[derive(Serialize)]
pub struct LocationsResponse {
    pub status: &'static str,
    pub provider: &'static str,
    pub data: Vec<Clinic>,
}

impl LocationsQuery {
    fn into_clinic_query(self) -> Result<ClinicQuery, ApiError> {
        let position = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)?),
            (None, None) => None,
            _ => {
                return Err(ApiError::BadRequest(
                    "latitude and longitude must be given together".into(),
                ))
            }
        };
        if self.radius == Some(0) {
            return Err(ApiError::BadRequest("radius must be positive".into()));
        }
        Ok(ClinicQuery {
            position,
            keyword: self.keyword,
            radius_m: self.radius,
        })
    }
}

/// `GET /api/locations?latitude=&longitude=&keyword=&radius=`
///
/// Providers block on network I/O, so the search runs on the blocking pool.
pub async fn nearby(
    State(ctx): State<ApiContext>,
    query: Result<Query<LocationsQuery>, QueryRejection>,
) -> Result<Json<LocationsResponse>, ApiError> {
    let Query(query) = query?;
    let clinic_query = query.into_clinic_query()?;
    let locator = ctx.core.clinics();
    let provider = locator.provider_name();

    let clinics =
        tokio::task::spawn_blocking(move || locator.search_nearby(&clinic_query)).await??;

    Ok(Json(LocationsResponse {
        status: "success",
        provider,
        data: clinics,
    }))
}
