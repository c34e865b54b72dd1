//! Denormalized read models: events with their sessions, sessions with their
//! questions and feedback. Every session view always carries `questions` and
//! `feedback`, default-filled when nothing is stored.

use std::collections::HashMap;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use devmeet_db::models::{
    Event, EventCategory, Question, Session, SessionFeedback, SessionSpeaker, SessionType, Speaker,
};
use serde::Serialize;

use crate::lifecycle::{self, ClockState, SessionStatus};

#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub attendee_count: i64,
    pub max_attendees: i64,
    pub price: String,
    pub is_free: bool,
    pub speakers: Vec<Speaker>,
    pub has_in_person: bool,
    pub has_online: bool,
    pub is_live: bool,
    pub tags: Vec<String>,
    pub category: EventCategory,
    pub featured_session_id: Option<String>,
    pub sessions: Vec<SessionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub event_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub completed: bool,
    pub is_active: bool,
    pub status: SessionStatus,
    pub status_label: &'static str,
    pub time_remaining_secs: i64,
    pub needs_attention: bool,
    /// Wall-clock view of the schedule, independent of the stored flags.
    pub clock: ClockState,
    pub speaker: Option<SessionSpeaker>,
    pub description: Option<String>,
    pub video_link: Option<String>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionView>,
    pub feedback: FeedbackView,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub session_id: String,
    pub text: Option<String>,
    pub author: String,
    pub is_hand_raise: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedbackView {
    pub rating: i32,
    pub tags: Vec<String>,
    pub comment: String,
}

fn hex(id: Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

impl From<Question> for QuestionView {
    fn from(q: Question) -> Self {
        Self {
            id: hex(q.id),
            session_id: q.session_id.to_hex(),
            text: q.text,
            author: q.author,
            is_hand_raise: q.is_hand_raise,
            created_at: q.created_at.to_chrono(),
        }
    }
}

impl From<SessionFeedback> for FeedbackView {
    fn from(f: SessionFeedback) -> Self {
        Self {
            rating: f.rating,
            tags: f.tags,
            comment: f.comment,
        }
    }
}

impl SessionView {
    pub fn build(
        session: Session,
        questions: Vec<Question>,
        feedback: Option<SessionFeedback>,
        now: DateTime<Utc>,
    ) -> Self {
        let start = session.start_time.to_chrono();
        let end = session.end_time.to_chrono();
        let status = lifecycle::derive_status(session.completed, session.is_active, start, end, now);

        Self {
            id: hex(session.id),
            event_id: session.event_id.to_hex(),
            title: session.title,
            session_type: session.session_type,
            start_time: start,
            end_time: end,
            completed: session.completed,
            is_active: session.is_active,
            status,
            status_label: status.label(),
            time_remaining_secs: lifecycle::time_remaining(end, now),
            needs_attention: status.needs_attention(),
            clock: ClockState::at(start, end, now),
            speaker: session.speaker,
            description: session.description,
            video_link: session.video_link,
            actual_start_time: session.actual_start_time.map(|t| t.to_chrono()),
            actual_end_time: session.actual_end_time.map(|t| t.to_chrono()),
            questions: questions.into_iter().map(QuestionView::from).collect(),
            feedback: feedback.map(FeedbackView::from).unwrap_or_default(),
        }
    }
}

impl EventView {
    pub fn build(event: Event, sessions: Vec<SessionView>) -> Self {
        let is_free = event.is_free();
        Self {
            id: hex(event.id),
            title: event.title,
            description: event.description,
            date: event.date,
            time: event.time,
            location: event.location,
            attendee_count: event.attendee_count,
            max_attendees: event.max_attendees,
            price: event.price,
            is_free,
            speakers: event.speakers,
            has_in_person: event.has_in_person,
            has_online: event.has_online,
            is_live: event.is_live,
            tags: event.tags,
            category: event.category,
            featured_session_id: event.featured_session_id.map(|id| id.to_hex()),
            sessions,
        }
    }
}

/// Joins sessions with their questions and first feedback row. Keeps the
/// input order of `sessions` and of `questions` within each session.
pub fn assemble_sessions(
    sessions: Vec<Session>,
    questions: Vec<Question>,
    feedback: Vec<SessionFeedback>,
    now: DateTime<Utc>,
) -> Vec<SessionView> {
    let mut questions_by_session: HashMap<ObjectId, Vec<Question>> = HashMap::new();
    for q in questions {
        questions_by_session.entry(q.session_id).or_default().push(q);
    }

    let mut feedback_by_session: HashMap<ObjectId, SessionFeedback> = HashMap::new();
    for f in feedback {
        feedback_by_session.entry(f.session_id).or_insert(f);
    }

    sessions
        .into_iter()
        .map(|session| {
            let (questions, feedback) = match session.id {
                Some(id) => (
                    questions_by_session.remove(&id).unwrap_or_default(),
                    feedback_by_session.remove(&id),
                ),
                None => (Vec::new(), None),
            };
            SessionView::build(session, questions, feedback, now)
        })
        .collect()
}

/// Attaches session views to their events, keeping event order.
pub fn assemble_events(events: Vec<Event>, sessions: Vec<SessionView>) -> Vec<EventView> {
    let mut sessions_by_event: HashMap<String, Vec<SessionView>> = HashMap::new();
    for s in sessions {
        sessions_by_event.entry(s.event_id.clone()).or_default().push(s);
    }

    events
        .into_iter()
        .map(|event| {
            let sessions = sessions_by_event.remove(&hex(event.id)).unwrap_or_default();
            EventView::build(event, sessions)
        })
        .collect()
}
