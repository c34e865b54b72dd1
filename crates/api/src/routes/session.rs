use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use devmeet_db::models::{SessionSpeaker, SessionType};
use devmeet_services::{
    dao::session::{NewSession, SessionPatch},
    views::SessionView,
};
use serde::Deserialize;
use validator::Validate;

use super::{event_of_session, parse_id};
use crate::{
    error::ApiError,
    state::AppState,
    ws::dispatcher::{Action, Entity, publish_change},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(rename = "type", default)]
    pub session_type: SessionType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_active: bool,
    pub speaker: Option<SessionSpeaker>,
    pub description: Option<String>,
    #[validate(url)]
    pub video_link: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSessionRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub session_type: Option<SessionType>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
    pub is_active: Option<bool>,
    /// `null` clears the field; omitting it leaves it unchanged.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub speaker: Option<Option<SessionSpeaker>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(url)]
    pub video_link: Option<Option<String>>,
}

pub async fn list_by_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<SessionView>>, ApiError> {
    let event_id = parse_id(&event_id, "event_id")?;
    Ok(Json(
        state.catalog.sessions_by_event(event_id, Utc::now()).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    body.validate()?;
    let event_id = parse_id(&event_id, "event_id")?;

    let session = state
        .sessions
        .create(
            &state.events,
            NewSession {
                event_id,
                title: body.title,
                session_type: body.session_type,
                start_time: body.start_time,
                end_time: body.end_time,
                completed: body.completed,
                is_active: body.is_active,
                speaker: body.speaker,
                description: body.description,
                video_link: body.video_link,
            },
        )
        .await?;

    let id = session
        .id
        .ok_or_else(|| ApiError::Internal("Session without id".to_string()))?;
    publish_change(&state.ws_storage, event_id, Entity::Session, Action::Created, id).await;

    Ok((StatusCode::CREATED, fetch_view(&state, id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_id(&session_id, "session_id")?;
    fetch_view(&state, id).await
}

pub async fn update(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<UpdateSessionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    body.validate()?;
    let id = parse_id(&session_id, "session_id")?;

    let patch = SessionPatch {
        title: body.title,
        session_type: body.session_type,
        start_time: body.start_time,
        end_time: body.end_time,
        completed: body.completed,
        is_active: body.is_active,
        speaker: body.speaker,
        description: body.description,
        video_link: body.video_link,
    };
    let session = state.sessions.update(id, &patch).await?;
    publish_change(
        &state.ws_storage,
        session.event_id,
        Entity::Session,
        Action::Updated,
        id,
    )
    .await;

    fetch_view(&state, id).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&session_id, "session_id")?;

    let event_id = event_of_session(&state, id).await;
    let report = state.sessions.delete_cascade(id).await?;
    if let Some(event_id) = event_id {
        publish_change(&state.ws_storage, event_id, Entity::Session, Action::Deleted, id).await;
    }

    Ok(Json(serde_json::json!({
        "deleted": true,
        "questions": report.questions,
        "feedback": report.feedback,
    })))
}

pub async fn start(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_id(&session_id, "session_id")?;

    let session = state.sessions.start(id).await?;
    publish_change(
        &state.ws_storage,
        session.event_id,
        Entity::Session,
        Action::Updated,
        id,
    )
    .await;

    fetch_view(&state, id).await
}

pub async fn end(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_id(&session_id, "session_id")?;

    let session = state.sessions.end(id).await?;
    publish_change(
        &state.ws_storage,
        session.event_id,
        Entity::Session,
        Action::Updated,
        id,
    )
    .await;

    fetch_view(&state, id).await
}

async fn fetch_view(
    state: &AppState,
    id: bson::oid::ObjectId,
) -> Result<Json<SessionView>, ApiError> {
    state
        .catalog
        .session_by_id(id, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))
}
