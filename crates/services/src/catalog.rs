use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use devmeet_db::models::{Event, EventCategory, Session};
use tracing::debug;

use crate::dao::{
    DaoResult, event::EventDao, feedback::FeedbackDao, question::QuestionDao, session::SessionDao,
};
use crate::views::{self, EventView, SessionView};

/// Read path: assembles aggregated views from the four collections.
///
/// Joins happen in memory with one query per collection. Nothing is cached.
pub struct CatalogService {
    events: Arc<EventDao>,
    sessions: Arc<SessionDao>,
    questions: Arc<QuestionDao>,
    feedback: Arc<FeedbackDao>,
}

impl CatalogService {
    pub fn new(
        events: Arc<EventDao>,
        sessions: Arc<SessionDao>,
        questions: Arc<QuestionDao>,
        feedback: Arc<FeedbackDao>,
    ) -> Self {
        Self {
            events,
            sessions,
            questions,
            feedback,
        }
    }

    pub async fn all_events(&self, now: DateTime<Utc>) -> DaoResult<Vec<EventView>> {
        let events = self.events.find_all().await?;
        self.expand_events(events, now).await
    }

    /// `None` when no event has this id.
    pub async fn event_by_id(
        &self,
        id: ObjectId,
        now: DateTime<Utc>,
    ) -> DaoResult<Option<EventView>> {
        let Some(event) = self.events.base.find_one(bson::doc! { "_id": id }).await? else {
            debug!(event_id = %id, "Event not found");
            return Ok(None);
        };
        Ok(self.expand_events(vec![event], now).await?.pop())
    }

    pub async fn events_by_category(
        &self,
        category: EventCategory,
        now: DateTime<Utc>,
    ) -> DaoResult<Vec<EventView>> {
        let events = self.events.find_by_category(category).await?;
        self.expand_events(events, now).await
    }

    pub async fn live_events(&self, now: DateTime<Utc>) -> DaoResult<Vec<EventView>> {
        let events = self.events.find_live().await?;
        self.expand_events(events, now).await
    }

    pub async fn upcoming_events(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> DaoResult<Vec<EventView>> {
        let events = self.events.find_upcoming(today).await?;
        self.expand_events(events, now).await
    }

    pub async fn sessions_by_event(
        &self,
        event_id: ObjectId,
        now: DateTime<Utc>,
    ) -> DaoResult<Vec<SessionView>> {
        let sessions = self.sessions.find_by_event(event_id).await?;
        self.expand_sessions(sessions, now).await
    }

    /// `None` when no session has this id.
    pub async fn session_by_id(
        &self,
        id: ObjectId,
        now: DateTime<Utc>,
    ) -> DaoResult<Option<SessionView>> {
        let Some(session) = self.sessions.base.find_one(bson::doc! { "_id": id }).await? else {
            debug!(session_id = %id, "Session not found");
            return Ok(None);
        };
        Ok(self.expand_sessions(vec![session], now).await?.pop())
    }

    async fn expand_events(
        &self,
        events: Vec<Event>,
        now: DateTime<Utc>,
    ) -> DaoResult<Vec<EventView>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let event_ids: Vec<ObjectId> = events.iter().filter_map(|e| e.id).collect();
        let sessions = self.sessions.find_by_events(&event_ids).await?;
        let sessions = self.expand_sessions(sessions, now).await?;
        Ok(views::assemble_events(events, sessions))
    }

    async fn expand_sessions(
        &self,
        sessions: Vec<Session>,
        now: DateTime<Utc>,
    ) -> DaoResult<Vec<SessionView>> {
        if sessions.is_empty() {
            return Ok(Vec::new());
        }
        let session_ids: Vec<ObjectId> = sessions.iter().filter_map(|s| s.id).collect();
        let questions = self.questions.list_by_sessions(&session_ids).await?;
        let feedback = self.feedback.list_by_sessions(&session_ids).await?;
        Ok(views::assemble_sessions(sessions, questions, feedback, now))
    }
}
