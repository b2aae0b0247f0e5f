#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use coursehub_api::config::{CertificateConfig, ServerConfig};
use coursehub_api::router::build_app_router;
use coursehub_api::state::AppState;

pub const TEST_SECRET: &str = "api-test-secret";
pub const TEST_BASE_URL: &str = "https://learn.example.com";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, a fixed certificate secret and auto-issue on.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        certificates: CertificateConfig {
            secret: TEST_SECRET.to_string(),
            default_validity_years: Some(2),
            max_downloads: None,
            auto_issue: true,
            public_base_url: TEST_BASE_URL.to_string(),
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Like [`build_test_app`] with a caller-tuned configuration.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let config = Arc::new(config);
    let state = AppState::new(pool, Arc::clone(&config));
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a user through the API and return its id.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/users",
        serde_json::json!({ "name": email, "email": email, "role": role }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a course with `lessons` lessons; returns (course id, lesson ids).
pub async fn create_course(
    pool: &PgPool,
    certificate_available: bool,
    validity_years: Option<i32>,
    lessons: i32,
) -> (i64, Vec<i64>) {
    let email = format!("instructor-{}@example.com", user_count(pool).await);
    let instructor = create_user(pool, &email, "instructor").await;
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/courses",
        serde_json::json!({
            "instructor_id": instructor,
            "title": "c1",
            "certificate_available": certificate_available,
            "certificate_validity_years": validity_years,
        }),
    )
    .await;
    let course_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let mut lesson_ids = Vec::new();
    for position in 1..=lessons {
        let response = post_json(
            build_test_app(pool.clone()),
            &format!("/api/v1/courses/{course_id}/lessons"),
            serde_json::json!({ "title": format!("Lesson {position}"), "position": position }),
        )
        .await;
        lesson_ids.push(body_json(response).await["data"]["id"].as_i64().unwrap());
    }
    (course_id, lesson_ids)
}

/// Mark a lesson completed (or not) for a user; returns the response body.
pub async fn set_progress(
    pool: &PgPool,
    lesson_id: i64,
    user_id: i64,
    completed: bool,
) -> serde_json::Value {
    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/lessons/{lesson_id}/progress"),
        serde_json::json!({ "user_id": user_id, "completed": completed }),
    )
    .await;
    body_json(response).await
}

/// Used to derive distinct fixture emails within one test database.
async fn user_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}
