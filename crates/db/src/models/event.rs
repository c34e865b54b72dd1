use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A community gathering. `date` and `time` are display strings, not calendar types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub attendee_count: i64,
    #[serde(default)]
    pub max_attendees: i64,
    pub price: String,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub has_in_person: bool,
    #[serde(default)]
    pub has_online: bool,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: EventCategory,
    /// Display emphasis only; not checked against the event's own sessions.
    pub featured_session_id: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Speaker {
    pub name: String,
    pub role: String,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Workshop,
    #[default]
    Talk,
    Networking,
    Hackathon,
    Conference,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Workshop => "workshop",
            EventCategory::Talk => "talk",
            EventCategory::Networking => "networking",
            EventCategory::Hackathon => "hackathon",
            EventCategory::Conference => "conference",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "workshop" => Some(EventCategory::Workshop),
            "talk" => Some(EventCategory::Talk),
            "networking" => Some(EventCategory::Networking),
            "hackathon" => Some(EventCategory::Hackathon),
            "conference" => Some(EventCategory::Conference),
            _ => None,
        }
    }
}

impl Event {
    pub const COLLECTION: &'static str = "events";

    pub fn is_free(&self) -> bool {
        self.price.trim().eq_ignore_ascii_case("free")
    }
}
