//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;
use waymark_core::clock::Clock;
use waymark_core::ports::FlagStore;
use waymark_flag_store::memory::InMemoryFlagStore;
use waymark_overlay::domain::settings::TourSettings;
use waymark_sequencer::domain::registry::StaticTemplateRegistry;
use waymark_test_support::{FixedClock, three_step_template};

use waymark_api::build_router;
use waymark_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Application state with in-memory flags and the `three-step` scenario
/// registered. Clone the router per request; state is shared.
pub fn test_state() -> AppState {
    test_state_with_flags(Arc::new(InMemoryFlagStore::new()))
}

/// Application state over `flag_store`.
pub fn test_state_with_flags(flag_store: Arc<dyn FlagStore>) -> AppState {
    let registry = StaticTemplateRegistry::from_templates(vec![three_step_template()]).unwrap();
    AppState::new(
        TourSettings::default(),
        Arc::new(registry),
        flag_store,
        fixed_clock(),
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    build_router(state)
}

/// Launch body for `identity` on `/` with a desktop viewport.
pub fn launch_body(identity: Uuid, scenario_id: Option<&str>, mode: &str) -> serde_json::Value {
    serde_json::json!({
        "identity": identity,
        "scenario_id": scenario_id,
        "mode": mode,
        "viewport": { "width": 1280.0, "height": 800.0 },
        "location": "/",
    })
}

/// Launches a `three-step` tour and returns its session id.
pub async fn launch_three_step(app: &Router) -> Uuid {
    let (status, json) = post_json(
        app.clone(),
        "/api/v1/tours",
        &launch_body(Uuid::new_v4(), Some("three-step"), "always"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["tour"]["session_id"].as_str().unwrap().parse().unwrap()
}

/// Sends a tour command and returns the response.
pub async fn command(
    app: &Router,
    session_id: Uuid,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_json(
        app.clone(),
        &format!("/api/v1/tours/{session_id}/commands"),
        &body,
    )
    .await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    read_json(app.oneshot(request).await.unwrap()).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    read_json(app.oneshot(request).await.unwrap()).await
}

/// Send a DELETE request and return the response.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    read_json(app.oneshot(request).await.unwrap()).await
}
