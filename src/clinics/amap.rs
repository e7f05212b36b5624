use std::time::Duration;

use serde::Deserialize;

use super::{Clinic, ClinicError, ClinicLocator, ClinicQuery, GeoPoint, DEFAULT_KEYWORD};

const AMAP_BASE_URL: &str = "https://restapi.amap.com";
/// Healthcare service POI category.
const AMAP_POI_TYPE: &str = "090000";
const PAGE_SIZE: u32 = 15;

/// AMap (Gaode) place search around a point.
pub struct AmapClinics {
    base_url: String,
    key: String,
    client: reqwest::blocking::Client,
}

impl AmapClinics {
    pub fn new(key: &str, timeout_secs: u64) -> Result<Self, ClinicError> {
        Self::with_base_url(AMAP_BASE_URL, key, timeout_secs)
    }

    pub fn with_base_url(base_url: &str, key: &str, timeout_secs: u64) -> Result<Self, ClinicError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClinicError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
        })
    }
}

/// Response body from /v3/place/around
#[derive(Deserialize)]
struct AroundResponse {
    status: String,
    #[serde(default)]
    info: String,
    #[serde(default)]
    pois: Vec<AmapPoi>,
}

/// AMap sends `[]` instead of a string for missing text fields.
#[derive(Deserialize)]
struct AmapPoi {
    id: String,
    name: String,
    #[serde(default)]
    address: serde_json::Value,
    #[serde(default)]
    tel: serde_json::Value,
    location: String,
    #[serde(default)]
    distance: serde_json::Value,
}

fn text(value: &serde_json::Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

/// "lng,lat" as used by AMap.
fn parse_location(raw: &str) -> Result<GeoPoint, ClinicError> {
    let bad = || ClinicError::ResponseParsing(format!("invalid location: {raw}"));
    let (lng, lat) = raw.split_once(',').ok_or_else(bad)?;
    let lng: f64 = lng.trim().parse().map_err(|_| bad())?;
    let lat: f64 = lat.trim().parse().map_err(|_| bad())?;
    Ok(GeoPoint { lat, lng })
}

/// Meters; unparseable values read as 0 and oversized ones saturate.
fn parse_distance(value: &serde_json::Value) -> u32 {
    let meters = match value {
        serde_json::Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        _ => 0,
    };
    u32::try_from(meters).unwrap_or(u32::MAX)
}

fn clinics_from_response(body: &str) -> Result<Vec<Clinic>, ClinicError> {
    let parsed: AroundResponse =
        serde_json::from_str(body).map_err(|e| ClinicError::ResponseParsing(e.to_string()))?;

    if parsed.status != "1" {
        return Err(ClinicError::Provider {
            status: parsed.status,
            info: parsed.info,
        });
    }

    let mut clinics = parsed
        .pois
        .iter()
        .map(|poi| {
            Ok(Clinic {
                id: poi.id.clone(),
                name: poi.name.clone(),
                address: text(&poi.address),
                distance: parse_distance(&poi.distance),
                tel: text(&poi.tel),
                location: parse_location(&poi.location)?,
            })
        })
        .collect::<Result<Vec<_>, ClinicError>>()?;
    clinics.sort_by_key(|c| c.distance);
    Ok(clinics)
}

impl ClinicLocator for AmapClinics {
    fn search_nearby(&self, query: &ClinicQuery) -> Result<Vec<Clinic>, ClinicError> {
        let url = format!("{}/v3/place/around", self.base_url);
        let position = query.position_or_fallback();
        let location = format!("{:.6},{:.6}", position.lng, position.lat);
        let radius = query.radius_m().to_string();
        let page_size = PAGE_SIZE.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.key.as_str()),
                ("location", location.as_str()),
                ("keywords", query.keyword().unwrap_or(DEFAULT_KEYWORD)),
                ("types", AMAP_POI_TYPE),
                ("radius", radius.as_str()),
                ("offset", page_size.as_str()),
                ("page", "1"),
                ("extensions", "base"),
            ])
            .send()
            .map_err(|e| ClinicError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClinicError::Provider {
                status: status.as_u16().to_string(),
                info: response.text().unwrap_or_default(),
            });
        }

        let body = response
            .text()
            .map_err(|e| ClinicError::ResponseParsing(e.to_string()))?;
        let clinics = clinics_from_response(&body)?;
        tracing::debug!(count = clinics.len(), radius = query.radius_m(), "AMap place search");
        Ok(clinics)
    }

    fn provider_name(&self) -> &'static str {
        "amap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pois_sorted_by_distance() {
        let body = r#"{
            "status": "1", "info": "OK", "count": "2",
            "pois": [
                {"id": "B0FFG", "name": "Far Clinic", "address": "2 Far Road", "tel": [],
                 "location": "116.40,39.91", "distance": "1500"},
                {"id": "B0FFH", "name": "Near Clinic", "address": [], "tel": "010-1234",
                 "location": "116.39,39.90", "distance": "300"}
            ]
        }"#;
        let clinics = clinics_from_response(body).unwrap();
        assert_eq!(clinics.len(), 2);
        assert_eq!(clinics[0].name, "Near Clinic");
        assert_eq!(clinics[0].distance, 300);
        assert_eq!(clinics[0].address, "");
        assert_eq!(clinics[0].location, GeoPoint { lat: 39.90, lng: 116.39 });
        assert_eq!(clinics[1].tel, "");
    }

    #[test]
    fn provider_failure_status() {
        let body = r#"{"status": "0", "info": "INVALID_USER_KEY", "infocode": "10001"}"#;
        match clinics_from_response(body) {
            Err(ClinicError::Provider { status, info }) => {
                assert_eq!(status, "0");
                assert_eq!(info, "INVALID_USER_KEY");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn malformed_location_is_rejected() {
        let body = r#"{"status": "1", "pois": [
            {"id": "x", "name": "x", "location": "nowhere", "distance": "1"}
        ]}"#;
        assert!(matches!(
            clinics_from_response(body),
            Err(ClinicError::ResponseParsing(_))
        ));
    }

    #[test]
    fn distance_saturates_instead_of_wrapping() {
        use serde_json::json;
        assert_eq!(parse_distance(&json!("245")), 245);
        assert_eq!(parse_distance(&json!(4_294_967_296u64)), u32::MAX);
        assert_eq!(parse_distance(&json!("4294967296")), u32::MAX);
        assert_eq!(parse_distance(&json!("far")), 0);
        assert_eq!(parse_distance(&json!(null)), 0);
    }

    #[test]
    fn unreachable_host_is_http_error() {
        let locator = AmapClinics::with_base_url("http://127.0.0.1:1", "key", 2).unwrap();
        assert!(matches!(
            locator.search_nearby(&ClinicQuery::default()),
            Err(ClinicError::Http(_))
        ));
    }
}
