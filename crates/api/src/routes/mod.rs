pub mod event;
pub mod feedback;
pub mod question;
pub mod session;

use bson::oid::ObjectId;

use crate::{error::ApiError, state::AppState};

pub(crate) fn parse_id(raw: &str, field: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {field}")))
}

/// Owning event of a session, for change notifications. `None` once the session is gone.
pub(crate) async fn event_of_session(state: &AppState, session_id: ObjectId) -> Option<ObjectId> {
    state
        .sessions
        .base
        .find_one(bson::doc! { "_id": session_id })
        .await
        .ok()
        .flatten()
        .map(|s| s.event_id)
}
