use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use devmeet_db::models::{EventCategory, Speaker};
use devmeet_services::{
    dao::event::{EventPatch, NewEvent},
    views::EventView,
};
use serde::Deserialize;
use validator::Validate;

use super::parse_id;
use crate::{
    error::ApiError,
    state::AppState,
    ws::dispatcher::{Action, Entity, publish_change},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: String,
    #[validate(length(min = 1, message = "date must not be empty"))]
    pub date: String,
    pub time: String,
    pub location: String,
    #[validate(range(min = 0))]
    pub attendee_count: i64,
    #[validate(range(min = 0))]
    pub max_attendees: i64,
    pub price: String,
    pub speakers: Vec<Speaker>,
    pub has_in_person: bool,
    pub has_online: bool,
    pub is_live: bool,
    pub tags: Vec<String>,
    pub category: EventCategory,
    pub featured_session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "date must not be empty"))]
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub attendee_count: Option<i64>,
    #[validate(range(min = 0))]
    pub max_attendees: Option<i64>,
    pub price: Option<String>,
    pub speakers: Option<Vec<Speaker>>,
    pub has_in_person: Option<bool>,
    pub has_online: Option<bool>,
    pub is_live: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub category: Option<EventCategory>,
    /// `null` clears the featured session.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub featured_session_id: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SetLiveRequest {
    pub is_live: bool,
}

#[derive(Debug, Deserialize)]
pub struct AttendeeDeltaRequest {
    pub delta: i64,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<EventView>>, ApiError> {
    Ok(Json(state.catalog.all_events(Utc::now()).await?))
}

pub async fn live(State(state): State<AppState>) -> Result<Json<Vec<EventView>>, ApiError> {
    Ok(Json(state.catalog.live_events(Utc::now()).await?))
}

pub async fn upcoming(State(state): State<AppState>) -> Result<Json<Vec<EventView>>, ApiError> {
    let now = Utc::now();
    Ok(Json(
        state.catalog.upcoming_events(now.date_naive(), now).await?,
    ))
}

pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<EventView>>, ApiError> {
    let category = EventCategory::parse(&category)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown category: {category}")))?;
    Ok(Json(
        state.catalog.events_by_category(category, Utc::now()).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventView>), ApiError> {
    body.validate()?;

    let featured_session_id = body
        .featured_session_id
        .as_deref()
        .map(|id| parse_id(id, "featured_session_id"))
        .transpose()?;

    let event = state
        .events
        .create(NewEvent {
            title: body.title,
            description: body.description,
            date: body.date,
            time: body.time,
            location: body.location,
            attendee_count: body.attendee_count,
            max_attendees: body.max_attendees,
            price: body.price,
            speakers: body.speakers,
            has_in_person: body.has_in_person,
            has_online: body.has_online,
            is_live: body.is_live,
            tags: body.tags,
            category: body.category,
            featured_session_id,
        })
        .await?;

    let id = event.id.ok_or_else(|| ApiError::Internal("Event without id".to_string()))?;
    publish_change(&state.ws_storage, id, Entity::Event, Action::Created, id).await;

    Ok((StatusCode::CREATED, Json(EventView::build(event, Vec::new()))))
}

pub async fn get(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventView>, ApiError> {
    let id = parse_id(&event_id, "event_id")?;
    state
        .catalog
        .event_by_id(id, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
}

pub async fn update(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Json<EventView>, ApiError> {
    body.validate()?;
    let id = parse_id(&event_id, "event_id")?;

    let featured_session_id = body
        .featured_session_id
        .map(|inner| {
            inner
                .map(|id| parse_id(&id, "featured_session_id"))
                .transpose()
        })
        .transpose()?;

    let patch = EventPatch {
        title: body.title,
        description: body.description,
        date: body.date,
        time: body.time,
        location: body.location,
        attendee_count: body.attendee_count,
        max_attendees: body.max_attendees,
        price: body.price,
        speakers: body.speakers,
        has_in_person: body.has_in_person,
        has_online: body.has_online,
        is_live: body.is_live,
        tags: body.tags,
        category: body.category,
        featured_session_id,
    };
    state.events.update(id, &patch).await?;
    publish_change(&state.ws_storage, id, Entity::Event, Action::Updated, id).await;

    fetch_view(&state, id).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&event_id, "event_id")?;

    let report = state.events.delete_cascade(&state.sessions, id).await?;
    publish_change(&state.ws_storage, id, Entity::Event, Action::Deleted, id).await;

    Ok(Json(serde_json::json!({
        "deleted": true,
        "sessions": report.sessions,
        "questions": report.questions,
        "feedback": report.feedback,
    })))
}

pub async fn set_live(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(body): Json<SetLiveRequest>,
) -> Result<Json<EventView>, ApiError> {
    let id = parse_id(&event_id, "event_id")?;

    state.events.set_live(id, body.is_live).await?;
    publish_change(&state.ws_storage, id, Entity::Event, Action::Updated, id).await;

    fetch_view(&state, id).await
}

pub async fn attendee(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(body): Json<AttendeeDeltaRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&event_id, "event_id")?;

    let event = state.events.update_attendee_count(id, body.delta).await?;
    publish_change(&state.ws_storage, id, Entity::Event, Action::Updated, id).await;

    Ok(Json(serde_json::json!({
        "id": event_id,
        "attendee_count": event.attendee_count,
        "max_attendees": event.max_attendees,
    })))
}

async fn fetch_view(state: &AppState, id: bson::oid::ObjectId) -> Result<Json<EventView>, ApiError> {
    state
        .catalog
        .event_by_id(id, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
}
