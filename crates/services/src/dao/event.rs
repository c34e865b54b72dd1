use bson::{doc, oid::ObjectId, DateTime, Document};
use chrono::NaiveDate;
use devmeet_db::models::{Event, EventCategory, Speaker};
use mongodb::{Database, options::ReturnDocument};
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult, set_unset};
use super::session::{CascadeReport, SessionDao};
use crate::calendar;

pub struct EventDao {
    pub base: BaseDao<Event>,
}

/// Fields for a new event. Everything except `featured_session_id` is required.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub attendee_count: i64,
    pub max_attendees: i64,
    pub price: String,
    pub speakers: Vec<Speaker>,
    pub has_in_person: bool,
    pub has_online: bool,
    pub is_live: bool,
    pub tags: Vec<String>,
    pub category: EventCategory,
    pub featured_session_id: Option<ObjectId>,
}

/// Partial update: `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub attendee_count: Option<i64>,
    pub max_attendees: Option<i64>,
    pub price: Option<String>,
    pub speakers: Option<Vec<Speaker>>,
    pub has_in_person: Option<bool>,
    pub has_online: Option<bool>,
    pub is_live: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub category: Option<EventCategory>,
    /// `Some(None)` clears the featured session.
    pub featured_session_id: Option<Option<ObjectId>>,
}

impl EventPatch {
    pub fn to_update_document(&self) -> DaoResult<Document> {
        let mut set = Document::new();
        if let Some(v) = &self.title {
            set.insert("title", v.as_str());
        }
        if let Some(v) = &self.description {
            set.insert("description", v.as_str());
        }
        if let Some(v) = &self.date {
            set.insert("date", v.as_str());
        }
        if let Some(v) = &self.time {
            set.insert("time", v.as_str());
        }
        if let Some(v) = &self.location {
            set.insert("location", v.as_str());
        }
        if let Some(v) = self.attendee_count {
            set.insert("attendee_count", v);
        }
        if let Some(v) = self.max_attendees {
            set.insert("max_attendees", v);
        }
        if let Some(v) = &self.price {
            set.insert("price", v.as_str());
        }
        if let Some(v) = &self.speakers {
            set.insert("speakers", bson::to_bson(v)?);
        }
        if let Some(v) = self.has_in_person {
            set.insert("has_in_person", v);
        }
        if let Some(v) = self.has_online {
            set.insert("has_online", v);
        }
        if let Some(v) = self.is_live {
            set.insert("is_live", v);
        }
        if let Some(v) = &self.tags {
            set.insert("tags", v.clone());
        }
        if let Some(v) = self.category {
            set.insert("category", v.as_str());
        }
        let mut unset = Document::new();
        match self.featured_session_id {
            Some(Some(v)) => {
                set.insert("featured_session_id", v);
            }
            Some(None) => {
                unset.insert("featured_session_id", "");
            }
            None => {}
        }
        Ok(set_unset(set, unset))
    }
}

impl EventDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Event::COLLECTION),
        }
    }

    pub async fn create(&self, new: NewEvent) -> DaoResult<Event> {
        let now = DateTime::now();
        let event = Event {
            id: None,
            title: new.title,
            description: new.description,
            date: new.date,
            time: new.time,
            location: new.location,
            attendee_count: new.attendee_count,
            max_attendees: new.max_attendees,
            price: new.price,
            speakers: new.speakers,
            has_in_person: new.has_in_person,
            has_online: new.has_online,
            is_live: new.is_live,
            tags: new.tags,
            category: new.category,
            featured_session_id: new.featured_session_id,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&event).await?;
        info!(event_id = %id, "Event created");
        self.base.find_by_id(id).await
    }

    /// Every event in insertion order.
    pub async fn find_all(&self) -> DaoResult<Vec<Event>> {
        self.base.find_many(doc! {}, Some(doc! { "_id": 1 })).await
    }

    pub async fn find_by_category(&self, category: EventCategory) -> DaoResult<Vec<Event>> {
        self.base
            .find_many(
                doc! { "category": category.as_str() },
                Some(doc! { "_id": 1 }),
            )
            .await
    }

    pub async fn find_live(&self) -> DaoResult<Vec<Event>> {
        self.base
            .find_many(doc! { "is_live": true }, Some(doc! { "_id": 1 }))
            .await
    }

    /// Events dated `today` or later, earliest first.
    pub async fn find_upcoming(&self, today: NaiveDate) -> DaoResult<Vec<Event>> {
        let events = self.find_all().await?;
        Ok(calendar::upcoming(events, today))
    }

    pub async fn update(&self, id: ObjectId, patch: &EventPatch) -> DaoResult<Event> {
        let update = patch.to_update_document()?;
        if !update.is_empty() {
            self.base.update_by_id(id, update).await?;
        }
        self.base.find_by_id(id).await
    }

    pub async fn set_live(&self, id: ObjectId, is_live: bool) -> DaoResult<Event> {
        self.base
            .update_by_id(id, doc! { "$set": { "is_live": is_live } })
            .await?;
        info!(event_id = %id, is_live, "Event live flag set");
        self.base.find_by_id(id).await
    }

    /// Adds `delta` to the attendee count, clamping at zero, in a single server-side write.
    pub async fn update_attendee_count(&self, id: ObjectId, delta: i64) -> DaoResult<Event> {
        let pipeline = vec![doc! {
            "$set": {
                "attendee_count": {
                    "$max": [0_i64, { "$add": [{ "$ifNull": ["$attendee_count", 0_i64] }, delta] }]
                },
                "updated_at": DateTime::now(),
            }
        }];

        self.base
            .collection()
            .find_one_and_update(doc! { "_id": id }, pipeline)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(DaoError::NotFound)
    }

    /// Deletes the event and everything it owns, children first.
    ///
    /// Not transactional: a failure part-way leaves the remaining rows in place.
    pub async fn delete_cascade(
        &self,
        sessions: &SessionDao,
        id: ObjectId,
    ) -> DaoResult<CascadeReport> {
        if !self.base.exists(doc! { "_id": id }).await? {
            return Err(DaoError::NotFound);
        }

        let session_ids: Vec<ObjectId> = sessions
            .find_by_event(id)
            .await?
            .into_iter()
            .filter_map(|s| s.id)
            .collect();

        let report = sessions.purge(&session_ids).await?;
        self.base.delete_by_id(id).await?;

        info!(
            event_id = %id,
            sessions = report.sessions,
            questions = report.questions,
            feedback = report.feedback,
            "Event deleted"
        );
        Ok(report)
    }
}
