use crate::fixtures::test_app::TestApp;
use chrono::{Duration, Utc};
use serde_json::Value;

#[tokio::test]
async fn create_session_returns_derived_status() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Status").await;

    let resp = app
        .get(&format!("/api/session/{}", session_id))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["type"], "talk");
    assert_eq!(json["completed"], false);
    assert_eq!(json["is_active"], false);
    assert_eq!(json["status"], "should-be-active");
    assert_eq!(json["status_label"], "Should be active");
    assert!(json["time_remaining_secs"].as_i64().unwrap() > 0);
    assert_eq!(json["needs_attention"], true);
    assert_eq!(json["clock"]["is_active"], true);
    assert_eq!(json["speaker"]["avatar"], "GH");
}

#[tokio::test]
async fn future_and_overdue_sessions_report_upcoming_and_missed() {
    let app = TestApp::spawn().await;
    let event = app.create_event("Schedule", serde_json::json!({})).await;
    let event_id = event["id"].as_str().unwrap();
    let now = Utc::now();

    let later = app
        .create_session(
            event_id,
            "Later",
            "talk",
            now + Duration::hours(1),
            now + Duration::hours(2),
        )
        .await;
    let earlier = app
        .create_session(
            event_id,
            "Earlier",
            "break",
            now - Duration::hours(2),
            now - Duration::hours(1),
        )
        .await;

    assert_eq!(later["status"], "upcoming");
    assert_eq!(earlier["status"], "missed");
    assert_eq!(earlier["time_remaining_secs"], 0);
}

#[tokio::test]
async fn list_sessions_of_event() {
    let app = TestApp::spawn().await;
    let (event_id, session_id) = app.seed_talk("Listing").await;
    let other = app.create_event("Other", serde_json::json!({})).await;
    let now = Utc::now();
    app.create_session(
        other["id"].as_str().unwrap(),
        "Elsewhere",
        "talk",
        now,
        now + Duration::hours(1),
    )
    .await;

    let sessions: Vec<Value> = app
        .get(&format!("/api/event/{}/session", event_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["id"], session_id);
    assert_eq!(sessions[0]["event_id"], event_id);
}

#[tokio::test]
async fn session_for_missing_event_is_not_found() {
    let app = TestApp::spawn().await;
    let now = Utc::now();

    let resp = app
        .post(&format!(
            "/api/event/{}/session",
            bson::oid::ObjectId::new().to_hex()
        ))
        .json(&serde_json::json!({
            "title": "Orphan",
            "type": "talk",
            "start_time": now.to_rfc3339(),
            "end_time": (now + Duration::hours(1)).to_rfc3339(),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn session_ending_before_start_is_rejected() {
    let app = TestApp::spawn().await;
    let event = app.create_event("Backwards", serde_json::json!({})).await;
    let now = Utc::now();

    let resp = app
        .post(&format!(
            "/api/event/{}/session",
            event["id"].as_str().unwrap()
        ))
        .json(&serde_json::json!({
            "title": "Time travel",
            "type": "talk",
            "start_time": now.to_rfc3339(),
            "end_time": (now - Duration::hours(1)).to_rfc3339(),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn invalid_video_link_is_rejected() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Video").await;

    let resp = app
        .put(&format!("/api/session/{}", session_id))
        .json(&serde_json::json!({ "video_link": "not a url" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .put(&format!("/api/session/{}", session_id))
        .json(&serde_json::json!({ "video_link": "https://youtu.be/abc" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["video_link"], "https://youtu.be/abc");
}

#[tokio::test]
async fn null_clears_optional_session_fields() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Clearable").await;

    app.put(&format!("/api/session/{}", session_id))
        .json(&serde_json::json!({
            "video_link": "https://youtu.be/abc",
            "description": "Slides to follow",
        }))
        .send()
        .await
        .unwrap();

    let resp = app
        .put(&format!("/api/session/{}", session_id))
        .json(&serde_json::json!({ "video_link": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert!(json["video_link"].is_null());
    assert_eq!(json["description"], "Slides to follow");

    let resp = app
        .put(&format!("/api/session/{}", session_id))
        .json(&serde_json::json!({ "description": null }))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert!(json["description"].is_null());
}

#[tokio::test]
async fn patch_that_inverts_window_is_rejected() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Window").await;

    let resp = app
        .put(&format!("/api/session/{}", session_id))
        .json(&serde_json::json!({
            "end_time": (Utc::now() - Duration::days(1)).to_rfc3339(),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn start_then_end_session() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Lifecycle").await;

    let resp = app
        .post(&format!("/api/session/{}/start", session_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["is_active"], true);
    assert_eq!(json["status"], "active");
    assert_eq!(json["status_label"], "Live Now");
    assert!(json["actual_start_time"].is_string());

    let resp = app
        .post(&format!("/api/session/{}/end", session_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["is_active"], false);
    assert_eq!(json["completed"], true);
    assert_eq!(json["status"], "completed");
    assert!(json["actual_end_time"].is_string());
}

#[tokio::test]
async fn completed_flag_wins_over_active_flag() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Priority").await;

    let resp = app
        .put(&format!("/api/session/{}", session_id))
        .json(&serde_json::json!({ "completed": true, "is_active": true }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "completed");
}

#[tokio::test]
async fn start_missing_session_is_not_found() {
    let app = TestApp::spawn().await;

    let resp = app
        .post(&format!(
            "/api/session/{}/start",
            bson::oid::ObjectId::new().to_hex()
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn empty_session_update_keeps_record() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Noop").await;

    let resp = app
        .put(&format!("/api/session/{}", session_id))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["title"], "Opening talk");
}
