use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use devmeet_db::models::Question;
use devmeet_services::{dao::question::QuestionPatch, views::QuestionView};
use serde::Deserialize;
use validator::Validate;

use super::{event_of_session, parse_id};
use crate::{
    error::ApiError,
    state::AppState,
    ws::dispatcher::{Action, Entity, publish_change},
};

#[derive(Debug, Deserialize, Validate)]
pub struct AskQuestionRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct HandRequest {
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: Option<String>,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: Option<String>,
    pub is_hand_raise: Option<bool>,
}

pub async fn list(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<QuestionView>>, ApiError> {
    let session_id = parse_id(&session_id, "session_id")?;
    let questions = state.questions.list_by_session(session_id).await?;
    Ok(Json(questions.into_iter().map(QuestionView::from).collect()))
}

pub async fn ask(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<AskQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionView>), ApiError> {
    body.validate()?;
    let session_id = parse_id(&session_id, "session_id")?;

    let question = state
        .questions
        .ask(&state.sessions, session_id, body.text, body.author)
        .await?;
    notify(&state, &question, Action::Created).await;

    Ok((StatusCode::CREATED, Json(QuestionView::from(question))))
}

pub async fn raise_hand(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<HandRequest>,
) -> Result<Json<QuestionView>, ApiError> {
    body.validate()?;
    let session_id = parse_id(&session_id, "session_id")?;

    let question = state
        .questions
        .raise_hand(&state.sessions, session_id, body.author)
        .await?;
    notify(&state, &question, Action::Updated).await;

    Ok(Json(QuestionView::from(question)))
}

pub async fn lower_hand(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<HandRequest>,
) -> Result<StatusCode, ApiError> {
    body.validate()?;
    let session_id = parse_id(&session_id, "session_id")?;

    let question = state.questions.lower_hand(session_id, &body.author).await?;
    notify(&state, &question, Action::Deleted).await;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_hand(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Json<QuestionView>, ApiError> {
    let id = parse_id(&question_id, "question_id")?;

    let question = state.questions.toggle_hand_raise(id).await?;
    notify(&state, &question, Action::Updated).await;

    Ok(Json(QuestionView::from(question)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    Json(body): Json<UpdateQuestionRequest>,
) -> Result<Json<QuestionView>, ApiError> {
    body.validate()?;
    let id = parse_id(&question_id, "question_id")?;

    let patch = QuestionPatch {
        text: body.text,
        author: body.author,
        is_hand_raise: body.is_hand_raise,
    };
    let question = state.questions.update(id, &patch).await?;
    notify(&state, &question, Action::Updated).await;

    Ok(Json(QuestionView::from(question)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&question_id, "question_id")?;

    let question = state.questions.remove(id).await?;
    notify(&state, &question, Action::Deleted).await;

    Ok(StatusCode::NO_CONTENT)
}

async fn notify(state: &AppState, question: &Question, action: Action) {
    let Some(id) = question.id else { return };
    if let Some(event_id) = event_of_session(state, question.session_id).await {
        publish_change(&state.ws_storage, event_id, Entity::Question, action, id).await;
    }
}
