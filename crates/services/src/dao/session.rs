use bson::{doc, oid::ObjectId, DateTime, Document};
use chrono::Utc;
use devmeet_db::models::{Question, Session, SessionFeedback, SessionSpeaker, SessionType};
use mongodb::Database;
use serde::Serialize;
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult, set_unset};
use super::event::EventDao;

pub struct SessionDao {
    pub base: BaseDao<Session>,
    pub questions: BaseDao<Question>,
    pub feedback: BaseDao<SessionFeedback>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub event_id: ObjectId,
    pub title: String,
    pub session_type: SessionType,
    pub start_time: chrono::DateTime<Utc>,
    pub end_time: chrono::DateTime<Utc>,
    pub completed: bool,
    pub is_active: bool,
    pub speaker: Option<SessionSpeaker>,
    pub description: Option<String>,
    pub video_link: Option<String>,
}

/// Partial update: `None` leaves the stored field untouched and, for the
/// optional fields, `Some(None)` clears it. `event_id` is immutable.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub session_type: Option<SessionType>,
    pub start_time: Option<chrono::DateTime<Utc>>,
    pub end_time: Option<chrono::DateTime<Utc>>,
    pub completed: Option<bool>,
    pub is_active: Option<bool>,
    pub speaker: Option<Option<SessionSpeaker>>,
    pub description: Option<Option<String>>,
    pub video_link: Option<Option<String>>,
}

impl SessionPatch {
    pub fn to_update_document(&self) -> DaoResult<Document> {
        let mut set = Document::new();
        if let Some(v) = &self.title {
            set.insert("title", v.as_str());
        }
        if let Some(v) = self.session_type {
            set.insert("session_type", v.as_str());
        }
        if let Some(v) = self.start_time {
            set.insert("start_time", DateTime::from_chrono(v));
        }
        if let Some(v) = self.end_time {
            set.insert("end_time", DateTime::from_chrono(v));
        }
        if let Some(v) = self.completed {
            set.insert("completed", v);
        }
        if let Some(v) = self.is_active {
            set.insert("is_active", v);
        }

        let mut unset = Document::new();
        match &self.speaker {
            Some(Some(v)) => {
                set.insert("speaker", bson::to_bson(v)?);
            }
            Some(None) => {
                unset.insert("speaker", "");
            }
            None => {}
        }
        for (field, value) in [("description", &self.description), ("video_link", &self.video_link)] {
            match value {
                Some(Some(v)) => {
                    set.insert(field, v.as_str());
                }
                Some(None) => {
                    unset.insert(field, "");
                }
                None => {}
            }
        }
        Ok(set_unset(set, unset))
    }
}

/// Rows removed by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub sessions: u64,
    pub questions: u64,
    pub feedback: u64,
}

fn check_window(
    start: chrono::DateTime<Utc>,
    end: chrono::DateTime<Utc>,
) -> DaoResult<()> {
    if end < start {
        return Err(DaoError::Validation(
            "end_time must not be before start_time".to_string(),
        ));
    }
    Ok(())
}

impl SessionDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Session::COLLECTION),
            questions: BaseDao::new(db, Question::COLLECTION),
            feedback: BaseDao::new(db, SessionFeedback::COLLECTION),
        }
    }

    pub async fn create(&self, events: &EventDao, new: NewSession) -> DaoResult<Session> {
        check_window(new.start_time, new.end_time)?;
        if !events.base.exists(doc! { "_id": new.event_id }).await? {
            return Err(DaoError::NotFound);
        }

        let now = DateTime::now();
        let session = Session {
            id: None,
            event_id: new.event_id,
            title: new.title,
            session_type: new.session_type,
            start_time: DateTime::from_chrono(new.start_time),
            end_time: DateTime::from_chrono(new.end_time),
            completed: new.completed,
            is_active: new.is_active,
            speaker: new.speaker,
            description: new.description,
            video_link: new.video_link,
            actual_start_time: None,
            actual_end_time: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&session).await?;
        info!(session_id = %id, event_id = %new.event_id, "Session created");
        self.base.find_by_id(id).await
    }

    /// Sessions of one event in insertion order. Schedule order is the caller's job.
    pub async fn find_by_event(&self, event_id: ObjectId) -> DaoResult<Vec<Session>> {
        self.base
            .find_many(doc! { "event_id": event_id }, Some(doc! { "_id": 1 }))
            .await
    }

    pub async fn find_by_events(&self, event_ids: &[ObjectId]) -> DaoResult<Vec<Session>> {
        self.base
            .find_many(
                doc! { "event_id": { "$in": event_ids.to_vec() } },
                Some(doc! { "_id": 1 }),
            )
            .await
    }

    pub async fn update(&self, id: ObjectId, patch: &SessionPatch) -> DaoResult<Session> {
        let current = self.base.find_by_id(id).await?;

        let update = patch.to_update_document()?;
        if update.is_empty() {
            return Ok(current);
        }

        check_window(
            patch.start_time.unwrap_or_else(|| current.start_time.to_chrono()),
            patch.end_time.unwrap_or_else(|| current.end_time.to_chrono()),
        )?;

        self.base.update_by_id(id, update).await?;
        self.base.find_by_id(id).await
    }

    /// Operator pressed "start": the session is live.
    pub async fn start(&self, id: ObjectId) -> DaoResult<Session> {
        self.base
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "is_active": true,
                        "actual_start_time": DateTime::now(),
                    }
                },
            )
            .await?;
        info!(session_id = %id, "Session started");
        self.base.find_by_id(id).await
    }

    /// Operator pressed "end": the session is over and feedback opens.
    pub async fn end(&self, id: ObjectId) -> DaoResult<Session> {
        self.base
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "is_active": false,
                        "completed": true,
                        "actual_end_time": DateTime::now(),
                    }
                },
            )
            .await?;
        info!(session_id = %id, "Session ended");
        self.base.find_by_id(id).await
    }

    /// Deletes one session with its questions and feedback.
    pub async fn delete_cascade(&self, id: ObjectId) -> DaoResult<CascadeReport> {
        if !self.base.exists(doc! { "_id": id }).await? {
            return Err(DaoError::NotFound);
        }
        let report = self.purge(&[id]).await?;
        info!(
            session_id = %id,
            questions = report.questions,
            feedback = report.feedback,
            "Session deleted"
        );
        Ok(report)
    }

    /// Removes the given sessions and their children. Children go first so a
    /// crash part-way never leaves questions or feedback without a session.
    pub(crate) async fn purge(&self, session_ids: &[ObjectId]) -> DaoResult<CascadeReport> {
        if session_ids.is_empty() {
            return Ok(CascadeReport::default());
        }

        let filter = doc! { "session_id": { "$in": session_ids.to_vec() } };
        let questions = self.questions.hard_delete(filter.clone()).await?;
        let feedback = self.feedback.hard_delete(filter).await?;
        let sessions = self
            .base
            .hard_delete(doc! { "_id": { "$in": session_ids.to_vec() } })
            .await?;

        Ok(CascadeReport {
            sessions,
            questions,
            feedback,
        })
    }
}
