use crate::fixtures::test_app::TestApp;
use chrono::{Duration, Utc};
use serde_json::Value;

async fn ask(app: &TestApp, session_id: &str, text: &str, author: &str) -> reqwest::Response {
    app.post(&format!("/api/session/{}/question", session_id))
        .json(&serde_json::json!({ "text": text, "author": author }))
        .send()
        .await
        .unwrap()
}

async fn raise(app: &TestApp, session_id: &str, author: &str) -> reqwest::Response {
    app.post(&format!("/api/session/{}/hand", session_id))
        .json(&serde_json::json!({ "author": author }))
        .send()
        .await
        .unwrap()
}

async fn lower(app: &TestApp, session_id: &str, author: &str) -> reqwest::Response {
    app.delete(&format!("/api/session/{}/hand", session_id))
        .json(&serde_json::json!({ "author": author }))
        .send()
        .await
        .unwrap()
}

async fn toggle(app: &TestApp, question_id: &str) -> Value {
    app.post(&format!("/api/question/{}/hand", question_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn questions_are_listed_oldest_first() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Q&A").await;

    let resp = ask(&app, &session_id, "How does borrowing work?", "Linus").await;
    assert_eq!(resp.status().as_u16(), 201);
    let first: Value = resp.json().await.unwrap();
    assert_eq!(first["is_hand_raise"], false);
    assert_eq!(first["session_id"], session_id);

    ask(&app, &session_id, "Is async stable?", "Barbara").await;

    let questions: Vec<Value> = app
        .get(&format!("/api/session/{}/question", session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let authors: Vec<&str> = questions.iter().map(|q| q["author"].as_str().unwrap()).collect();
    assert_eq!(authors, vec!["Linus", "Barbara"]);
}

#[tokio::test]
async fn questions_appear_in_session_view() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Embedded Q").await;
    ask(&app, &session_id, "Why Rust?", "Ken").await;

    let json: Value = app
        .get(&format!("/api/session/{}", session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(json["questions"].as_array().unwrap().len(), 1);
    assert_eq!(json["questions"][0]["text"], "Why Rust?");
}

#[tokio::test]
async fn break_sessions_do_not_take_questions() {
    let app = TestApp::spawn().await;
    let event = app.create_event("Coffee", serde_json::json!({})).await;
    let now = Utc::now();
    let session = app
        .create_session(
            event["id"].as_str().unwrap(),
            "Coffee break",
            "break",
            now,
            now + Duration::minutes(15),
        )
        .await;
    let session_id = session["id"].as_str().unwrap();

    let resp = ask(&app, session_id, "Is there tea?", "Dennis").await;
    assert_eq!(resp.status().as_u16(), 422);

    let resp = raise(&app, session_id, "Dennis").await;
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn question_on_missing_session_is_not_found() {
    let app = TestApp::spawn().await;

    let resp = ask(
        &app,
        &bson::oid::ObjectId::new().to_hex(),
        "Anyone there?",
        "Ghost",
    )
    .await;

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn empty_question_text_is_rejected() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Blank").await;

    let resp = ask(&app, &session_id, "", "Someone").await;

    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn raising_a_hand_twice_keeps_one_row() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Hands").await;

    let resp = raise(&app, &session_id, "Margaret").await;
    assert_eq!(resp.status().as_u16(), 200);
    let first: Value = resp.json().await.unwrap();
    assert_eq!(first["is_hand_raise"], true);
    assert_eq!(first["text"], "Raised a hand");

    let second: Value = raise(&app, &session_id, "Margaret").await.json().await.unwrap();
    assert_eq!(second["id"], first["id"]);

    let questions: Vec<Value> = app
        .get(&format!("/api/session/{}/question", session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(questions.len(), 1);
}

#[tokio::test]
async fn lowering_a_hand_removes_it() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Lower").await;
    raise(&app, &session_id, "Alan").await;

    let resp = lower(&app, &session_id, "Alan").await;
    assert_eq!(resp.status().as_u16(), 204);

    let resp = lower(&app, &session_id, "Alan").await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn toggle_flips_hand_raise_flag() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Toggle").await;
    let question: Value = ask(&app, &session_id, "Toggle me", "Edsger")
        .await
        .json()
        .await
        .unwrap();
    let id = question["id"].as_str().unwrap();

    let json = toggle(&app, id).await;
    assert_eq!(json["is_hand_raise"], true);

    let json = toggle(&app, id).await;
    assert_eq!(json["is_hand_raise"], false);
}

#[tokio::test]
async fn toggle_missing_question_is_not_found() {
    let app = TestApp::spawn().await;

    let resp = app
        .post(&format!(
            "/api/question/{}/hand",
            bson::oid::ObjectId::new().to_hex()
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn update_and_delete_question() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Edit").await;
    let question: Value = ask(&app, &session_id, "Typo quesiton", "Niklaus")
        .await
        .json()
        .await
        .unwrap();
    let id = question["id"].as_str().unwrap();

    let resp = app
        .put(&format!("/api/question/{}", id))
        .json(&serde_json::json!({ "text": "Fixed question" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["text"], "Fixed question");
    assert_eq!(json["author"], "Niklaus");

    let resp = app
        .delete(&format!("/api/question/{}", id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = app
        .delete(&format!("/api/question/{}", id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn hand_raise_and_toggle_share_the_question_list() {
    let app = TestApp::spawn().await;
    let (event_id, session_id) = app.seed_talk("Scenario").await;

    let plain: Value = ask(&app, &session_id, "First?", "Anders").await.json().await.unwrap();
    ask(&app, &session_id, "Second?", "Bjarne").await;
    raise(&app, &session_id, "Chris").await;

    let plain_id = plain["id"].as_str().unwrap();
    let toggled = toggle(&app, plain_id).await;
    assert_eq!(toggled["id"], plain_id);
    assert_eq!(toggled["is_hand_raise"], true);

    let sessions: Vec<Value> = app
        .get(&format!("/api/event/{}/session", event_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let questions = sessions[0]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    let raised = questions
        .iter()
        .filter(|q| q["is_hand_raise"] == true)
        .count();
    assert_eq!(raised, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_hand_raises_leave_one_row() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("Rush").await;

    let requests = (0..10).map(|_| raise(&app, &session_id, "Grace"));
    let responses = futures::future::join_all(requests).await;

    let mut ids = Vec::new();
    for resp in responses {
        assert_eq!(resp.status().as_u16(), 200);
        let json: Value = resp.json().await.unwrap();
        ids.push(json["id"].as_str().unwrap().to_string());
    }
    ids.dedup();
    assert_eq!(ids.len(), 1, "every raise should return the same row");

    let questions: Vec<Value> = app
        .get(&format!("/api/session/{}/question", session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(questions.len(), 1);
}

#[tokio::test]
async fn toggling_a_second_hand_for_the_same_author_conflicts() {
    let app = TestApp::spawn().await;
    let (_, session_id) = app.seed_talk("One hand").await;

    raise(&app, &session_id, "Chris").await;
    let question: Value = ask(&app, &session_id, "Follow-up?", "Chris")
        .await
        .json()
        .await
        .unwrap();

    let resp = app
        .post(&format!("/api/question/{}/hand", question["id"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);

    let questions: Vec<Value> = app
        .get(&format!("/api/session/{}/question", session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let raised = questions
        .iter()
        .filter(|q| q["is_hand_raise"] == true)
        .count();
    assert_eq!(raised, 1);
}
