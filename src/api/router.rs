use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::accreditation;
use super::auth;
use super::events;
use super::health;
use super::index;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::index))
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Authentication
        .nest("/auth", auth::create_auth_router())
        .route("/logout", get(auth::logout))
        // Events and team forms
        .route("/events", get(events::list_events))
        .route("/events/{event_id}", get(events::event_page))
        .route(
            "/events/{event_id}/teams/{team}/accreditation",
            get(accreditation::get_form).post(accreditation::submit_form),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Local};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::domain::cache::MockCache;
    use crate::domain::event::{event_registrations_key, Person, Registration, EVENT_LIST_KEY};
    use crate::domain::{Cache, User};
    use crate::infrastructure::accreditation::InMemoryAccreditationRepository;
    use crate::infrastructure::auth::{JwtConfig, JwtService};
    use crate::infrastructure::events::CacheEventSource;
    use crate::infrastructure::services::{AccreditationService, EventService, TrackerSettings};
    use crate::infrastructure::user::{
        Argon2Hasher, CreateUserRequest, InMemoryUserRepository, UserService,
    };

    struct TestApp {
        router: Router,
        jwt: Arc<JwtService>,
        captain: User,
        outsider: User,
    }

    async fn app_with_cache(cache: Arc<dyn Cache>) -> TestApp {
        let users = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
        ));
        let captain = users
            .create(CreateUserRequest {
                id: "ann".to_string(),
                username: "ann".to_string(),
                email: "ann@x.org".to_string(),
                password: "correct-horse".to_string(),
                is_superuser: false,
            })
            .await
            .unwrap();
        let outsider = users
            .create(CreateUserRequest {
                id: "zed".to_string(),
                username: "zed".to_string(),
                email: "zed@x.org".to_string(),
                password: "correct-horse".to_string(),
                is_superuser: false,
            })
            .await
            .unwrap();

        let source = Arc::new(CacheEventSource::new(cache.clone()));
        let repository = Arc::new(InMemoryAccreditationRepository::new());
        let settings = TrackerSettings::default();
        let jwt = Arc::new(JwtService::new(JwtConfig::new("test-secret", 1)));

        let state = AppState::new(
            Arc::new(EventService::new(source.clone(), repository.clone(), settings)),
            Arc::new(AccreditationService::new(source, repository, settings)),
            users,
            jwt.clone(),
            cache,
        )
        .with_about_html("<p>About the tracker</p>\n");

        TestApp {
            router: create_router_with_state(state),
            jwt,
            captain,
            outsider,
        }
    }

    async fn app() -> TestApp {
        let end = Local::now().date_naive() + Duration::days(10);
        let cache = MockCache::new()
            .with_entry(
                EVENT_LIST_KEY,
                &json!([
                    {"id": 7, "name": "Nationals", "start": "2019-09-20", "end": end.to_string()},
                    {"id": 3, "name": "Regionals", "start": "2019-03-01", "end": "2019-03-03"}
                ]),
            )
            .with_entry(
                &event_registrations_key(7),
                &vec![
                    Registration::new(
                        Person::new("Ann").with_id(1).with_email("ann@x.org").with_slug("ann"),
                        Some("ATC Seniors"),
                        "captain",
                    ),
                    Registration::new(
                        Person::new("Bo").with_id(2).with_email("bo@x.org").with_slug("bo"),
                        Some("ATC Seniors"),
                        "player",
                    ),
                ],
            );

        app_with_cache(Arc::new(cache)).await
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app().await;

        let (status, body) = send(&app.router, get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = send(&app.router, get("/live", None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app.router, get("/ready", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "cache");
    }

    #[tokio::test]
    async fn test_ready_reports_cache_failure() {
        let app = app_with_cache(Arc::new(MockCache::new().with_error("connection refused"))).await;

        let (status, body) = send(&app.router, get("/ready", None)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_index_serves_about_html() {
        let app = app().await;

        let response = app.router.clone().oneshot(get("/", None)).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        assert!(String::from_utf8_lossy(&bytes).contains("<p>About the tracker</p>"));
    }

    #[tokio::test]
    async fn test_events_listing_is_public() {
        let app = app().await;

        let (status, body) = send(&app.router, get("/events", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["upcoming_events"][0]["id"], 7);
        assert_eq!(body["past_events"][0]["id"], 3);
    }

    #[tokio::test]
    async fn test_events_listing_with_broken_cache_is_server_error() {
        let app = app_with_cache(Arc::new(MockCache::new().with_error("connection refused"))).await;

        let (status, body) = send(&app.router, get("/events", None)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "server_error");
    }

    #[tokio::test]
    async fn test_login_and_me() {
        let app = app().await;

        let (status, body) = send(
            &app.router,
            post_json(
                "/auth/login",
                None,
                json!({"username": "ann", "password": "correct-horse"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app.router, get("/auth/me", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ann@x.org");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let app = app().await;

        let (status, body) = send(
            &app.router,
            post_json("/auth/login", None, json!({"username": "ann", "password": "wrong-pass"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_logout_needs_no_token() {
        let app = app().await;

        let (status, body) = send(&app.router, get("/logout", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redirect"], "/events");
    }

    #[tokio::test]
    async fn test_event_page_requires_token() {
        let app = app().await;

        let (status, _) = send(&app.router, get("/events/7", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app.router, get("/events/7", Some("not-a-jwt"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_event_page() {
        let app = app().await;
        let token = app.jwt.generate(&app.captain).unwrap();

        let (status, body) = send(&app.router, get("/events/7", Some(&token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["admin_teams"], json!(["ATC Seniors"]));
        let stats = &body["registrations_by_team"]["ATC Seniors"]["stats"];
        assert_eq!(stats["Players"], 2);
        assert_eq!(stats["complying"], false);
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let app = app().await;
        let token = app.jwt.generate(&app.captain).unwrap();

        let (status, body) = send(&app.router, get("/events/99", Some(&token))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");
    }

    #[tokio::test]
    async fn test_form_is_forbidden_for_outsider() {
        let app = app().await;
        let token = app.jwt.generate(&app.outsider).unwrap();

        let (status, _) = send(
            &app.router,
            get("/events/7/teams/ATC%20Seniors/accreditation", Some(&token)),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_form_submit_round_trip() {
        let app = app().await;
        let token = app.jwt.generate(&app.captain).unwrap();
        let uri = "/events/7/teams/ATC%20Seniors/accreditation";

        let (status, form) = send(&app.router, get(uri, Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(form["team_name"], "ATC Seniors");
        assert_eq!(form["new_players"].as_array().unwrap().len(), 2);

        let today = Local::now().date_naive().to_string();
        let rows = json!({"rows": [
            {"name": "Ann", "email": "ann@x.org", "type": "Advanced", "date": today,
             "uc_username": "ann", "wfdf_userid": 11},
            {"name": "Bo", "email": "bo@x.org", "type": "Standard", "date": today,
             "uc_username": "bo", "wfdf_userid": 12}
        ]});

        let (status, body) = send(&app.router, post_json(uri, Some(&token), rows)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["saved"].as_array().unwrap().len(), 2);
        assert_eq!(body["form"]["stats"]["Advanced"], 1);
        assert_eq!(body["form"]["existing"].as_array().unwrap().len(), 2);

        let (_, page) = send(&app.router, get("/events/7", Some(&token))).await;
        assert_eq!(page["registrations_by_team"]["ATC Seniors"]["stats"]["complying"], true);
    }

    #[tokio::test]
    async fn test_invalid_submission_is_unprocessable() {
        let app = app().await;
        let token = app.jwt.generate(&app.captain).unwrap();
        let uri = "/events/7/teams/ATC%20Seniors/accreditation";
        let rows = json!({"rows": [
            {"name": "Ann", "email": "same@x.org", "type": "Advanced", "date": "2019-01-01",
             "uc_username": "ann", "wfdf_userid": 11},
            {"name": "Bo", "email": "same@x.org", "type": "Standard", "date": "2019-01-01",
             "uc_username": "bo", "wfdf_userid": 12}
        ]});

        let (status, body) = send(&app.router, post_json(uri, Some(&token), rows)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["errors"],
            json!([{
                "row": 1,
                "field": "email",
                "message": "Please correct the duplicate data for email, which must be unique."
            }])
        );
        assert_eq!(body["rows"].as_array().unwrap().len(), 2);

        let (_, form) = send(&app.router, get(uri, Some(&token))).await;
        assert!(form["existing"].as_array().unwrap().is_empty());
    }
}
