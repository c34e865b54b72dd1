use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A question or a raised hand. A hand-raise is a row with `is_hand_raise = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub session_id: ObjectId,
    pub text: Option<String>,
    pub author: String,
    #[serde(default)]
    pub is_hand_raise: bool,
    pub created_at: DateTime,
}

impl Question {
    pub const COLLECTION: &'static str = "questions";
    pub const HAND_RAISE_TEXT: &'static str = "Raised a hand";
}
