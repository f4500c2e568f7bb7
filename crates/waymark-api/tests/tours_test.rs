//! Integration tests for the tour routes.

mod common;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

/// Polls `uri` until `ready` accepts the response, failing after a second.
async fn poll_until(
    app: &Router,
    uri: &str,
    ready: impl Fn(StatusCode, &serde_json::Value) -> bool,
) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            let (status, json) = common::get_json(app.clone(), uri).await;
            if ready(status, &json) {
                return json;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time")
}

// --- launch ---

#[tokio::test]
async fn test_launch_starts_default_tour_on_first_step() {
    let app = common::build_test_app(common::test_state());

    let (status, json) = common::post_json(
        app,
        "/api/v1/tours",
        &common::launch_body(Uuid::new_v4(), None, "if_unseen"),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["launched"], true);
    assert_eq!(json["tour"]["scenario_id"], "default");
    assert_eq!(json["tour"]["step_index"], 0);
    assert_eq!(json["tour"]["step"]["id"], "welcome");
    assert_eq!(json["tour"]["phase"], "active");
    assert_eq!(json["tour"]["visible"], true);
}

#[tokio::test]
async fn test_launch_is_suppressed_after_tour_was_seen() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let identity = Uuid::new_v4();
    let (_, json) = common::post_json(
        app.clone(),
        "/api/v1/tours",
        &common::launch_body(identity, Some("three-step"), "if_unseen"),
    )
    .await;
    let session_id: Uuid = json["tour"]["session_id"].as_str().unwrap().parse().unwrap();
    let (status, _) = common::command(&app, session_id, json!({ "command": "skip" })).await;
    assert_eq!(status, StatusCode::OK);

    // Act
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/tours",
        &common::launch_body(identity, Some("three-step"), "if_unseen"),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["launched"], false);
    assert!(json["tour"].is_null());

    // An explicit replay still launches.
    let (status, json) = common::post_json(
        app,
        "/api/v1/tours",
        &common::launch_body(identity, Some("three-step"), "always"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["tour"]["has_seen_tour"], true);
}

#[tokio::test]
async fn test_relaunch_for_same_identity_replaces_running_tour() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let identity = Uuid::new_v4();
    let body = common::launch_body(identity, Some("three-step"), "if_unseen");
    let (_, first) = common::post_json(app.clone(), "/api/v1/tours", &body).await;
    let first_id = first["tour"]["session_id"].as_str().unwrap().to_owned();

    // Act
    let (status, second) = common::post_json(app.clone(), "/api/v1/tours", &body).await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(second["tour"]["session_id"].as_str().unwrap(), first_id);
    let (_, health) = common::get_json(app.clone(), "/health").await;
    assert_eq!(health["active_tours"], 1);
    let (status, _) = common::get_json(app, &format!("/api/v1/tours/{first_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- teardown ---

#[tokio::test]
async fn test_delete_tears_down_tour_without_marking_it_seen() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let identity = Uuid::new_v4();
    let body = common::launch_body(identity, Some("three-step"), "if_unseen");
    let (_, json) = common::post_json(app.clone(), "/api/v1/tours", &body).await;
    let session_id: Uuid = json["tour"]["session_id"].as_str().unwrap().parse().unwrap();
    common::command(&app, session_id, json!({ "command": "speak" })).await;

    // Act
    let (status, _) = common::delete(app.clone(), &format!("/api/v1/tours/{session_id}")).await;

    // Assert
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = common::get_json(app.clone(), &format!("/api/v1/tours/{session_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, health) = common::get_json(app.clone(), "/health").await;
    assert_eq!(health["active_tours"], 0);

    // The tour was never closed, so the next visit shows it again.
    let (status, json) = common::post_json(app, "/api/v1/tours", &body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["tour"]["has_seen_tour"], false);
}

#[tokio::test]
async fn test_delete_unknown_session_returns_404() {
    let app = common::build_test_app(common::test_state());

    let (status, json) =
        common::delete(app, &format!("/api/v1/tours/{}", Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
}

#[tokio::test]
async fn test_next_without_observed_step_is_rejected() {
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;

    let (status, _) = common::command(&app, session_id, json!({ "command": "next" })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, snapshot) = common::get_json(app, &format!("/api/v1/tours/{session_id}")).await;
    assert_eq!(snapshot["step_index"], 0);
}

#[tokio::test]
async fn test_concurrent_next_requests_for_same_step_advance_once() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;
    let click = json!({ "command": "next", "from_step": 0 });

    // Act
    let (a, b) = tokio::join!(
        common::command(&app, session_id, click.clone()),
        common::command(&app, session_id, click),
    );

    // Assert
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    let (_, snapshot) = common::get_json(app, &format!("/api/v1/tours/{session_id}")).await;
    assert_eq!(snapshot["step_index"], 1);
}

// --- commands ---

#[tokio::test]
async fn test_next_command_advances_and_reports_events() {
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;

    let (status, json) =
        common::command(&app, session_id, json!({ "command": "next", "from_step": 0 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["snapshot"]["step_index"], 1);
    assert_eq!(json["snapshot"]["step"]["id"], "devotionals");
    let types: Vec<&str> = json["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"tour.step_changed"));
    assert!(types.contains(&"tour.navigation_requested"));
}

#[tokio::test]
async fn test_goto_out_of_range_clamps() {
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;

    let (status, json) =
        common::command(&app, session_id, json!({ "command": "goto", "index": 50 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["snapshot"]["step_index"], 2);
}

#[tokio::test]
async fn test_commands_after_close_return_410_but_snapshot_remains() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;
    common::command(&app, session_id, json!({ "command": "close" })).await;

    // Act
    let (status, json) =
        common::command(&app, session_id, json!({ "command": "next", "from_step": 0 })).await;

    // Assert
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(json["error"], "session_ended");

    let (status, json) =
        common::get_json(app, &format!("/api/v1/tours/{session_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "closed");
    assert_eq!(json["visible"], false);
}

#[tokio::test]
async fn test_unknown_session_returns_404() {
    let app = common::build_test_app(common::test_state());
    let session_id = Uuid::new_v4();

    let (status, json) = common::get_json(app, &format!("/api/v1/tours/{session_id}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
}

#[tokio::test]
async fn test_minimize_and_drag_commands_update_widget() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;

    // Act
    let (_, begin) = common::command(
        &app,
        session_id,
        json!({
            "command": "begin_drag",
            "pointer": { "x": 1000.0, "y": 700.0 },
            "target": "surface",
        }),
    )
    .await;
    let (_, moved) = common::command(
        &app,
        session_id,
        json!({ "command": "update_drag", "pointer": { "x": 0.0, "y": 0.0 } }),
    )
    .await;
    common::command(&app, session_id, json!({ "command": "end_drag" })).await;
    let (_, minimized) =
        common::command(&app, session_id, json!({ "command": "toggle_minimize" })).await;

    // Assert
    assert_ne!(begin["snapshot"]["widget_position"], moved["snapshot"]["widget_position"]);
    assert_eq!(moved["snapshot"]["widget_position"]["x"], 0.0);
    assert_eq!(moved["snapshot"]["widget_position"]["y"], 0.0);
    assert_eq!(minimized["snapshot"]["minimized"], true);
}

// --- narration ---

#[tokio::test]
async fn test_spoken_step_is_served_to_client_until_it_reports_the_end() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;
    let narration_uri = format!("/api/v1/tours/{session_id}/narration");
    let tour_uri = format!("/api/v1/tours/{session_id}");

    // Act
    common::command(&app, session_id, json!({ "command": "speak" })).await;
    let pending = poll_until(&app, &narration_uri, |status, _| status == StatusCode::OK).await;
    poll_until(&app, &tour_uri, |_, json| json["narration_active"] == true).await;

    let (status, _) = common::post_json(
        app.clone(),
        &format!("{narration_uri}/ended"),
        &json!({ "token": pending["token"] }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(pending["text"], "Welcome. Start here.");
    assert!(pending["media_type"].as_str().unwrap().starts_with("text/plain"));
    poll_until(&app, &tour_uri, |_, json| json["narration_active"] == false).await;
    let (status, _) = common::get_json(app, &narration_uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_client_speech_failure_raises_notice() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;
    let narration_uri = format!("/api/v1/tours/{session_id}/narration");
    common::command(&app, session_id, json!({ "command": "speak" })).await;
    let pending = poll_until(&app, &narration_uri, |status, _| status == StatusCode::OK).await;

    // Act
    let (status, _) = common::post_json(
        app.clone(),
        &format!("{narration_uri}/failed"),
        &json!({ "token": pending["token"], "reason": "speech synthesis blocked" }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::NO_CONTENT);
    let snapshot = poll_until(&app, &format!("/api/v1/tours/{session_id}"), |_, json| {
        !json["notice"].is_null()
    })
    .await;
    assert_eq!(snapshot["notice"], "narration_unavailable");
    assert_eq!(snapshot["narration_active"], false);
}

#[tokio::test]
async fn test_step_change_withdraws_pending_clip() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;
    let narration_uri = format!("/api/v1/tours/{session_id}/narration");
    common::command(&app, session_id, json!({ "command": "speak" })).await;
    let pending = poll_until(&app, &narration_uri, |status, _| status == StatusCode::OK).await;

    // Act
    common::command(&app, session_id, json!({ "command": "next", "from_step": 0 })).await;

    // Assert
    poll_until(&app, &narration_uri, |status, _| status == StatusCode::NO_CONTENT).await;
    let (status, json) = common::post_json(
        app,
        &format!("{narration_uri}/ended"),
        &json!({ "token": pending["token"] }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "stale_narration");
}

// --- completion ---

#[tokio::test]
async fn test_finishing_tour_produces_certificate() {
    // Arrange
    let app = common::build_test_app(common::test_state());
    let session_id = common::launch_three_step(&app).await;
    let certificate_uri = format!("/api/v1/tours/{session_id}/certificate");
    let (status, _) = common::get_json(app.clone(), &certificate_uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Act
    common::command(&app, session_id, json!({ "command": "goto", "index": 2 })).await;
    let (_, json) =
        common::command(&app, session_id, json!({ "command": "next", "from_step": 2 })).await;

    // Assert
    assert_eq!(json["snapshot"]["phase"], "completed");
    assert_eq!(json["snapshot"]["last_completed_template_id"], "three-step");
    let (status, certificate) = common::get_json(app, &certificate_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(certificate["template_id"], "three-step");
    assert_eq!(certificate["completed_at"], "2026-01-15T10:00:00Z");
}
