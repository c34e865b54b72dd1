use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use super::test_app::TestApp;

/// A minimal valid event body; `overrides` replaces top-level fields.
pub fn event_body(title: &str, overrides: Value) -> Value {
    let mut body = serde_json::json!({
        "title": title,
        "description": format!("{title} description"),
        "date": "2099-01-15",
        "time": "18:00 - 21:00",
        "location": "Cape Town",
        "attendee_count": 0,
        "max_attendees": 100,
        "price": "Free",
        "speakers": [{ "name": "Ada", "role": "Engineer", "company": "Acme" }],
        "has_in_person": true,
        "has_online": false,
        "is_live": false,
        "tags": ["rust"],
        "category": "talk",
    });

    if let (Some(target), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            target.insert(k.clone(), v.clone());
        }
    }
    body
}

impl TestApp {
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Creates an event through the API and returns its JSON view.
    pub async fn create_event(&self, title: &str, overrides: Value) -> Value {
        let resp = self
            .post("/api/event")
            .json(&event_body(title, overrides))
            .send()
            .await
            .expect("Create event request failed");

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        assert_eq!(status, 201, "Create event failed: {}", body);
        serde_json::from_str(&body).unwrap()
    }

    /// Creates a session spanning `[start, end)` and returns its JSON view.
    pub async fn create_session(
        &self,
        event_id: &str,
        title: &str,
        session_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Value {
        let resp = self
            .post(&format!("/api/event/{}/session", event_id))
            .json(&serde_json::json!({
                "title": title,
                "type": session_type,
                "start_time": start.to_rfc3339(),
                "end_time": end.to_rfc3339(),
                "speaker": { "name": "Grace Hopper", "avatar": "GH", "role": "Speaker" },
            }))
            .send()
            .await
            .expect("Create session request failed");

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        assert_eq!(status, 201, "Create session failed: {}", body);
        serde_json::from_str(&body).unwrap()
    }

    /// An event with one talk that started ten minutes ago and runs fifty more.
    pub async fn seed_talk(&self, title: &str) -> (String, String) {
        let event = self.create_event(title, serde_json::json!({})).await;
        let event_id = event["id"].as_str().unwrap().to_string();

        let now = Utc::now();
        let session = self
            .create_session(
                &event_id,
                "Opening talk",
                "talk",
                now - Duration::minutes(10),
                now + Duration::minutes(50),
            )
            .await;
        let session_id = session["id"].as_str().unwrap().to_string();

        (event_id, session_id)
    }
}
