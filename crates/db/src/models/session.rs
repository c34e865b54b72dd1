use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A time-boxed agenda item. `completed` and `is_active` are authoritative;
/// they only change through explicit start/end actions or patches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub event_id: ObjectId,
    pub title: String,
    pub session_type: SessionType,
    pub start_time: DateTime,
    pub end_time: DateTime,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_active: bool,
    pub speaker: Option<SessionSpeaker>,
    pub description: Option<String>,
    pub video_link: Option<String>,
    pub actual_start_time: Option<DateTime>,
    pub actual_end_time: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Denormalized speaker card; `avatar` holds initials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSpeaker {
    pub name: String,
    pub avatar: String,
    pub role: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Announcement,
    Break,
    #[default]
    Talk,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Announcement => "announcement",
            SessionType::Break => "break",
            SessionType::Talk => "talk",
        }
    }

    pub fn accepts_questions(&self) -> bool {
        matches!(self, SessionType::Talk)
    }
}

impl Session {
    pub const COLLECTION: &'static str = "sessions";
}
