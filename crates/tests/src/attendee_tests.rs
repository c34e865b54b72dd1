use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn adjust(app: &TestApp, event_id: &str, delta: i64) -> reqwest::Response {
    app.post(&format!("/api/event/{}/attendee", event_id))
        .json(&serde_json::json!({ "delta": delta }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn attendee_count_moves_by_delta() {
    let app = TestApp::spawn().await;
    let event = app
        .create_event("Counted", serde_json::json!({ "attendee_count": 5 }))
        .await;
    let id = event["id"].as_str().unwrap();

    let resp = adjust(&app, id, 3).await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["attendee_count"], 8);

    let json: Value = adjust(&app, id, -2).await.json().await.unwrap();
    assert_eq!(json["attendee_count"], 6);
}

#[tokio::test]
async fn attendee_count_never_goes_negative() {
    let app = TestApp::spawn().await;
    let event = app
        .create_event("Empty room", serde_json::json!({ "attendee_count": 5 }))
        .await;
    let id = event["id"].as_str().unwrap();

    let json: Value = adjust(&app, id, -1000).await.json().await.unwrap();
    assert_eq!(json["attendee_count"], 0);
}

#[tokio::test]
async fn attendee_count_on_missing_event_is_not_found() {
    let app = TestApp::spawn().await;

    let resp = adjust(&app, &bson::oid::ObjectId::new().to_hex(), 1).await;

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let app = TestApp::spawn().await;
    let event = app.create_event("Busy", serde_json::json!({})).await;
    let id = event["id"].as_str().unwrap();

    let requests = (0..20).map(|_| adjust(&app, id, 1));
    let responses = futures::future::join_all(requests).await;
    assert!(responses.iter().all(|r| r.status().as_u16() == 200));

    let json: Value = app
        .get(&format!("/api/event/{}", id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["attendee_count"], 20);
}
