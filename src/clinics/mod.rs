//! Nearby vaccination clinic search.
//!
//! `ClinicLocator` is the seam; `BundledClinics` answers offline from a fixed
//! list and `AmapClinics` queries the AMap place-search REST API.

mod amap;
mod bundled;

pub use amap::AmapClinics;
pub use bundled::BundledClinics;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Search keyword used when the caller gives none.
pub const DEFAULT_KEYWORD: &str = "vaccination";
/// Search radius in meters.
pub const DEFAULT_RADIUS_M: u32 = 5000;
/// Used when the caller has no position (Tiananmen, Beijing).
pub const FALLBACK_POSITION: GeoPoint = GeoPoint {
    lng: 116.397428,
    lat: 39.90923,
};

#[derive(Debug, Error)]
pub enum ClinicError {
    #[error("Clinic search request failed: {0}")]
    Http(String),

    #[error("Clinic provider returned status {status}: {info}")]
    Provider { status: String, info: String },

    #[error("Malformed clinic provider response: {0}")]
    ResponseParsing(String),

    #[error("Invalid clinic query: {0}")]
    InvalidQuery(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Rejects coordinates outside the valid latitude/longitude ranges.
    pub fn new(lat: f64, lng: f64) -> Result<Self, ClinicError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(ClinicError::InvalidQuery(format!(
                "coordinates out of range: {lat},{lng}"
            )));
        }
        Ok(Self { lat, lng })
    }
}

/// A vaccination site near the searched position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Meters from the searched position.
    pub distance: u32,
    pub tel: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Default)]
pub struct ClinicQuery {
    pub position: Option<GeoPoint>,
    pub keyword: Option<String>,
    pub radius_m: Option<u32>,
}

impl ClinicQuery {
    pub fn position_or_fallback(&self) -> GeoPoint {
        self.position.unwrap_or(FALLBACK_POSITION)
    }

    /// Trimmed keyword, if a non-blank one was given.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m.unwrap_or(DEFAULT_RADIUS_M)
    }
}

/// Finds clinics around a position. Implementations may block on network
/// I/O; async callers run them on a blocking thread.
pub trait ClinicLocator: Send + Sync {
    /// Results are sorted by distance, nearest first.
    fn search_nearby(&self, query: &ClinicQuery) -> Result<Vec<Clinic>, ClinicError>;

    fn provider_name(&self) -> &'static str;
}
