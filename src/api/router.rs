//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router with all endpoints under `/api/`.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/members",
            get(endpoints::members::list).post(endpoints::members::create),
        )
        .route(
            "/members/:member_id/schedule",
            get(endpoints::schedule::get_schedule).post(endpoints::schedule::plan),
        )
        .route(
            "/members/:member_id/schedule/:entry_id",
            get(endpoints::schedule::entry_detail),
        )
        .route(
            "/members/:member_id/records",
            get(endpoints::records::list).post(endpoints::records::create),
        )
        .route("/members/:member_id/home", get(endpoints::home::dashboard))
        .route(
            "/members/:member_id/reminders",
            get(endpoints::reminders::list),
        )
        .route("/knowledge-base", get(endpoints::knowledge::list))
        .route("/knowledge-base/:slug", get(endpoints::knowledge::article))
        .route("/locations", get(endpoints::locations::nearby))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(CorsLayer::permissive());

    Router::new().nest("/api", routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::clinics::{Clinic, ClinicError, ClinicLocator, ClinicQuery};
    use crate::core_state::test_state;
    use crate::schedule::VaccineCatalog;

    fn app(dir: &std::path::Path) -> Router {
        api_router(Arc::new(test_state(dir)))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create_member(app: &Router, birth_date: &str) -> String {
        let (status, json) = send(
            app,
            "POST",
            "/api/members",
            Some(serde_json::json!({ "name": "Mia", "birthDate": birth_date })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let (status, json) = send(&app(tmp.path()), "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["vaccineCount"], 12);
        assert_eq!(json["clinicProvider"], "bundled");
    }

    #[tokio::test]
    async fn held_write_lock_does_not_stall_other_requests() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let (status, _) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);

        let writer = rusqlite::Connection::open(tmp.path().join("test.db")).unwrap();
        writer.execute_batch("BEGIN IMMEDIATE").unwrap();

        let create = send(
            &app,
            "POST",
            "/api/members",
            Some(serde_json::json!({ "name": "Mia", "birthDate": "2024-01-01" })),
        );
        let health = async {
            let started = std::time::Instant::now();
            let (status, _) = send(&app, "GET", "/api/health", None).await;
            let elapsed = started.elapsed();
            writer.execute_batch("COMMIT").unwrap();
            (status, elapsed)
        };
        let ((create_status, _), (health_status, elapsed)) = tokio::join!(create, health);

        assert_eq!(health_status, StatusCode::OK);
        assert!(elapsed < std::time::Duration::from_secs(2), "health took {elapsed:?}");
        assert_eq!(create_status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn reminders_cover_doses_due_today() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let today = chrono::Local::now().date_naive();
        let id = create_member(&app, &today.to_string()).await;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/members/{id}/schedule"),
            Some(serde_json::json!({ "selectedVaccines": ["hepb", "bcg"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(&app, "GET", &format!("/api/members/{id}/reminders"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["withinDays"], 7);
        let reminders = json["reminders"].as_array().unwrap();
        assert_eq!(reminders.len(), 2);
        assert!(reminders
            .iter()
            .all(|r| r["kind"] == "due_soon" && r["daysLeft"] == 0));

        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/members/{id}/reminders?withinDays=400"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/members/{}/reminders", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn member_lifecycle() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());

        let id = create_member(&app, "2024-01-01").await;
        let (status, json) = send(&app, "GET", "/api/members", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["members"][0]["id"], id.as_str());
        assert_eq!(json["members"][0]["avatar"], "/avatars/child1.png");
    }

    #[tokio::test]
    async fn create_member_validation_is_400() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());

        let (status, json) = send(
            &app,
            "POST",
            "/api/members",
            Some(serde_json::json!({ "name": "", "birthDate": "2024-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, _) = send(
            &app,
            "POST",
            "/api/members",
            Some(serde_json::json!({ "name": "Mia", "birthDate": "not a date" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn plan_record_and_project() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create_member(&app, "2024-01-01").await;

        let (status, json) = send(
            &app,
            "POST",
            &format!("/api/members/{id}/schedule"),
            Some(serde_json::json!({ "selectedVaccines": ["hepb", "bcg", "nope"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["schedules"].as_array().unwrap().len(), 4);
        assert_eq!(json["added"], 4);
        assert_eq!(json["unknownVaccineIds"][0], "nope");
        assert_eq!(json["schedules"][2]["dueDate"], "2024-07-01");

        let (status, json) = send(
            &app,
            "POST",
            &format!("/api/members/{id}/records"),
            Some(serde_json::json!({
                "vaccineId": "hepb", "date": "2024-01-01", "location": "City Clinic", "dose": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["record"]["vaccineName"], "Hepatitis B vaccine");
        assert!(json["matchedEntryId"].is_string());

        let (status, json) = send(&app, "GET", &format!("/api/members/{id}/schedule"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["completedCount"], 1);
        assert_eq!(json["upcomingCount"], 3);
        assert_eq!(json["ordered"][3]["status"], "completed");
        assert!(json["next"]["vaccineId"].is_string());

        let (status, json) = send(&app, "GET", &format!("/api/members/{id}/records"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["records"].as_array().unwrap().len(), 1);

        let (status, json) = send(&app, "GET", &format!("/api/members/{id}/home"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["completedCount"], 1);
        assert_eq!(json["member"]["name"], "Mia");
    }

    #[tokio::test]
    async fn entry_detail_and_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create_member(&app, "2024-01-01").await;

        let (_, json) = send(
            &app,
            "POST",
            &format!("/api/members/{id}/schedule"),
            Some(serde_json::json!({ "selectedVaccines": ["mmr"] })),
        )
        .await;
        let entry_id = json["schedules"][0]["id"].as_str().unwrap().to_string();

        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/members/{id}/schedule/{entry_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["entry"]["dueDate"], "2024-09-01");
        assert_eq!(json["vaccine"]["slug"], "mmr");

        let missing = uuid::Uuid::new_v4();
        let (status, json) = send(
            &app,
            "GET",
            &format!("/api/members/{id}/schedule/{missing}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_and_malformed_member_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());

        let missing = uuid::Uuid::new_v4();
        for uri in [
            format!("/api/members/{missing}/schedule"),
            format!("/api/members/{missing}/records"),
            format!("/api/members/{missing}/home"),
        ] {
            let (status, _) = send(&app, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }

        let (status, _) = send(&app, "GET", "/api/members/abc/schedule", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn record_requires_location() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());
        let id = create_member(&app, "2024-01-01").await;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/members/{id}/records"),
            Some(serde_json::json!({ "vaccineId": "bcg", "date": "2024-01-02" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn knowledge_base_filters_and_articles() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());

        let (status, json) = send(&app, "GET", "/api/knowledge-base?category=recommended", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["vaccines"].as_array().unwrap().len(), 7);

        let (status, json) = send(&app, "GET", "/api/knowledge-base?q=measles", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["vaccines"][0]["slug"], "mmr");

        let (status, json) = send(&app, "GET", "/api/knowledge-base/varicella", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ageOffsetsMonths"][0], 12);
        assert!(json["content"]["preparation"].is_array());

        let (status, _) = send(&app, "GET", "/api/knowledge-base/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/api/knowledge-base?category=bogus", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn locations_use_bundled_provider() {
        let tmp = tempfile::tempdir().unwrap();
        let app = app(tmp.path());

        let (status, json) = send(&app, "GET", "/api/locations?keyword=vaccination", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"].as_array().unwrap().len(), 2);

        let (status, _) = send(&app, "GET", "/api/locations?latitude=31.2", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "GET", "/api/locations?latitude=100&longitude=10", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    struct FailingClinics;

    impl ClinicLocator for FailingClinics {
        fn search_nearby(&self, _query: &ClinicQuery) -> Result<Vec<Clinic>, ClinicError> {
            Err(ClinicError::Http("connection refused".into()))
        }

        fn provider_name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn clinic_provider_failure_is_502() {
        let tmp = tempfile::tempdir().unwrap();
        let core = CoreState::new(
            tmp.path().join("test.db"),
            VaccineCatalog::bundled().unwrap(),
            Arc::new(FailingClinics),
        );
        let app = api_router(Arc::new(core));

        let (status, json) = send(&app, "GET", "/api/locations", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPSTREAM");
    }
}
