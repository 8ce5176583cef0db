//! Router-level tests: requests go through the real middleware stack
//! (sessions, auth guards) against an in-memory database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;
use tower_sessions_sqlx_store::SqliteStore;

use ratemyday::{
    app::build_router,
    config::SessionConfig,
    repositories::{SqliteRatingRepository, SqliteSettingsRepository, SqliteUserRepository},
    services::{
        admin_service::AdminService, rating_service::RatingService,
        settings_service::SettingsService, user_service::UserService, MockEmailService,
    },
    test_utils::test_helpers,
    AppState,
};

async fn test_app() -> (Router, sqlx::SqlitePool) {
    let pool = test_helpers::create_test_db().await.unwrap();

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let rating_repository = Arc::new(SqliteRatingRepository::new(pool.clone()));
    let settings_repository = Arc::new(SqliteSettingsRepository::new(pool.clone()));
    let email_service = Arc::new(MockEmailService);

    let state = AppState {
        user_service: Arc::new(UserService::new(user_repository.clone())),
        rating_service: Arc::new(RatingService::new(rating_repository.clone())),
        settings_service: Arc::new(SettingsService::new(settings_repository.clone())),
        admin_service: Arc::new(AdminService::new(
            user_repository,
            rating_repository,
            email_service,
        )),
        pool: pool.clone(),
    };

    let session_store = SqliteStore::new(pool.clone())
        .with_table_name("sessions")
        .unwrap();
    session_store.migrate().await.unwrap();
    let session_layer = SessionConfig::from_env().create_layer(session_store);

    (build_router(state, session_layer), pool)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_body(email: &str) -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "dob": "1990-12-10",
        "email": email,
        "password": "password123",
    })
}

/// Register (when asked) and log in, returning the session cookie.
async fn login(app: &Router, email: &str, register: bool) -> String {
    if register {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/users/register", register_body(email)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users/login",
            json!({ "email": email, "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn register_then_duplicate_conflicts() {
    let (app, _pool) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            register_body("ada@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            register_body("ada@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn weak_password_is_a_bad_request() {
    let (app, _pool) = test_app().await;

    let mut body = register_body("ada@example.com");
    body["password"] = json!("short");

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/users/register", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _pool) = test_app().await;
    login(&app, "ada@example.com", true).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users/login",
            json!({ "email": "ada@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rating_routes_require_a_session() {
    let (app, _pool) = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/ratings/available-years")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn submit_then_read_back_a_rating() {
    let (app, _pool) = test_app().await;
    let cookie = login(&app, "ada@example.com", true).await;

    let response = app
        .clone()
        .oneshot(with_cookie(
            json_request(
                "POST",
                "/api/ratings/submit-rating",
                json!({ "ratingDate": "2024-05-02", "rating": 8, "note": "sunny" }),
            ),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(with_cookie(
            Request::builder()
                .uri("/api/ratings/submit-rating?ratingDate=2024-05-02")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["rating"], 8);
    assert_eq!(body["note"], "sunny");
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let (app, _pool) = test_app().await;
    let cookie = login(&app, "ada@example.com", true).await;

    let response = app
        .clone()
        .oneshot(with_cookie(
            json_request(
                "POST",
                "/api/ratings/submit-rating",
                json!({ "ratingDate": "2024-05-02", "rating": 11 }),
            ),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_round_trip_through_the_api() {
    let (app, _pool) = test_app().await;
    let cookie = login(&app, "ada@example.com", true).await;

    let response = app
        .clone()
        .oneshot(with_cookie(
            Request::builder()
                .uri("/api/settings")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let defaults = body_json(response).await;
    assert_eq!(defaults["sendReminders"], false);
    assert_eq!(defaults["reminderTime"], "08:00");

    let response = app
        .clone()
        .oneshot(with_cookie(
            json_request(
                "POST",
                "/api/settings",
                json!({ "sendReminders": true, "reminderCadence": "weekly" }),
            ),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(with_cookie(
            Request::builder()
                .uri("/api/settings")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();
    let saved = body_json(response).await;
    assert_eq!(saved["sendReminders"], true);
    assert_eq!(saved["reminderCadence"], "weekly");
    // Unpatched field kept its default.
    assert_eq!(saved["reminderTime"], "08:00");
}

#[tokio::test]
async fn admin_routes_reject_normal_users() {
    let (app, _pool) = test_app().await;
    let cookie = login(&app, "ada@example.com", true).await;

    let response = app
        .clone()
        .oneshot(with_cookie(
            Request::builder()
                .uri("/api/admin/stats")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admins_can_read_stats_and_broadcast() {
    let (app, pool) = test_app().await;
    test_helpers::insert_test_user(&pool, "admin@example.com", "password123", "admin")
        .await
        .unwrap();
    let cookie = login(&app, "admin@example.com", false).await;

    let response = app
        .clone()
        .oneshot(with_cookie(
            Request::builder()
                .uri("/api/admin/stats")
                .body(Body::empty())
                .unwrap(),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["userCount"], 1);

    let response = app
        .clone()
        .oneshot(with_cookie(
            json_request(
                "POST",
                "/api/admin/send-emails",
                json!({
                    "subject": "Scheduled maintenance",
                    "body": "We will be down briefly on Sunday.",
                    "recipientType": "all",
                }),
            ),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["sent"], 1);
    assert_eq!(outcome["failed"], 0);
}
