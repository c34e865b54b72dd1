use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Tags offered to attendees in the feedback form. Any tag is accepted on write.
pub const PREDEFINED_FEEDBACK_TAGS: [&str; 5] = [
    "Interesting topic",
    "Nice talk",
    "Great presentation",
    "Clear explanation",
    "Engaging",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFeedback {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub session_id: ObjectId,
    /// 1..=5 once rated; 0 means not rated yet.
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl SessionFeedback {
    pub const COLLECTION: &'static str = "session_feedback";
}
