use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use devmeet_db::models::PREDEFINED_FEEDBACK_TAGS;
use devmeet_services::{dao::feedback::{FeedbackPatch, MAX_RATING}, views::FeedbackView};
use serde::Deserialize;
use validator::Validate;

use super::{event_of_session, parse_id};
use crate::{
    error::ApiError,
    state::AppState,
    ws::dispatcher::{Action, Entity, publish_change},
};

/// Omitted fields keep their stored values.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitFeedbackRequest {
    #[validate(range(min = 0, max = 5, message = "rating must be between 0 and 5"))]
    pub rating: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub comment: Option<String>,
}

/// The session's feedback, or `null` when none was submitted.
pub async fn get(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Option<FeedbackView>>, ApiError> {
    let session_id = parse_id(&session_id, "session_id")?;
    let feedback = state.feedback.find_by_session(session_id).await?;
    Ok(Json(feedback.map(FeedbackView::from)))
}

pub async fn submit(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<SubmitFeedbackRequest>,
) -> Result<Json<FeedbackView>, ApiError> {
    body.validate()?;
    let session_id = parse_id(&session_id, "session_id")?;

    let feedback = state
        .feedback
        .upsert(
            &state.sessions,
            session_id,
            &FeedbackPatch {
                rating: body.rating,
                tags: body.tags,
                comment: body.comment,
            },
        )
        .await?;
    if let Some(event_id) = event_of_session(&state, session_id).await {
        publish_change(
            &state.ws_storage,
            event_id,
            Entity::Feedback,
            Action::Updated,
            session_id,
        )
        .await;
    }

    Ok(Json(FeedbackView::from(feedback)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_id(&session_id, "session_id")?;

    state.feedback.remove_by_session(session_id).await?;
    if let Some(event_id) = event_of_session(&state, session_id).await {
        publish_change(
            &state.ws_storage,
            event_id,
            Entity::Feedback,
            Action::Deleted,
            session_id,
        )
        .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn tags() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "tags": PREDEFINED_FEEDBACK_TAGS,
        "max_rating": MAX_RATING,
    }))
}
