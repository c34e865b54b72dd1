use bson::{doc, oid::ObjectId, DateTime, Document};
use devmeet_db::models::SessionFeedback;
use mongodb::{Database, options::ReturnDocument};
use tracing::{info, warn};

use super::base::{BaseDao, DaoError, DaoResult};
use super::session::SessionDao;

pub const MAX_RATING: i32 = 5;

/// Partial feedback: `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct FeedbackPatch {
    pub rating: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub comment: Option<String>,
}

impl FeedbackPatch {
    /// `$set` for the given fields, `$setOnInsert` defaults for the rest.
    fn to_update_document(&self) -> Document {
        let now = DateTime::now();
        let mut set = doc! { "updated_at": now };
        let mut on_insert = doc! { "created_at": now };

        match self.rating {
            Some(v) => set.insert("rating", v),
            None => on_insert.insert("rating", 0),
        };
        match &self.tags {
            Some(v) => set.insert("tags", v.clone()),
            None => on_insert.insert("tags", Vec::<String>::new()),
        };
        match &self.comment {
            Some(v) => set.insert("comment", v.as_str()),
            None => on_insert.insert("comment", ""),
        };

        doc! { "$set": set, "$setOnInsert": on_insert }
    }
}

pub struct FeedbackDao {
    pub base: BaseDao<SessionFeedback>,
}

impl FeedbackDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, SessionFeedback::COLLECTION),
        }
    }

    pub async fn find_by_session(&self, session_id: ObjectId) -> DaoResult<Option<SessionFeedback>> {
        self.base.find_one(doc! { "session_id": session_id }).await
    }

    pub async fn list_by_sessions(
        &self,
        session_ids: &[ObjectId],
    ) -> DaoResult<Vec<SessionFeedback>> {
        self.base
            .find_many(
                doc! { "session_id": { "$in": session_ids.to_vec() } },
                Some(doc! { "_id": 1 }),
            )
            .await
    }

    /// Applies `patch` to the session's feedback, creating the row on first
    /// submission. Fields left out keep their stored values; on insert they
    /// start at 0, `[]` and `""`.
    ///
    /// One conditional write against the unique `session_id` index, so
    /// concurrent submissions converge on a single row.
    pub async fn upsert(
        &self,
        sessions: &SessionDao,
        session_id: ObjectId,
        patch: &FeedbackPatch,
    ) -> DaoResult<SessionFeedback> {
        if let Some(rating) = patch.rating {
            if !(0..=MAX_RATING).contains(&rating) {
                return Err(DaoError::Validation(format!(
                    "rating must be between 0 and {MAX_RATING}"
                )));
            }
        }
        if !sessions.base.exists(doc! { "_id": session_id }).await? {
            return Err(DaoError::NotFound);
        }

        let filter = doc! { "session_id": session_id };
        let update = patch.to_update_document();

        let mut attempt = 0;
        let feedback = loop {
            attempt += 1;
            let result = self
                .base
                .collection()
                .find_one_and_update(filter.clone(), update.clone())
                .upsert(true)
                .return_document(ReturnDocument::After)
                .await;

            match result {
                Ok(doc) => break doc.ok_or(DaoError::NotFound)?,
                // Lost the insert race: the row exists now, so the retry updates it.
                Err(e) if attempt == 1 && super::base::is_duplicate_key(&e) => {
                    warn!(session_id = %session_id, "Concurrent feedback insert, retrying as update");
                }
                Err(e) => return Err(DaoError::from_write(e)),
            }
        };

        info!(session_id = %session_id, rating = feedback.rating, "Feedback saved");
        Ok(feedback)
    }

    pub async fn remove_by_session(&self, session_id: ObjectId) -> DaoResult<()> {
        let deleted = self
            .base
            .hard_delete(doc! { "session_id": session_id })
            .await?;
        if deleted == 0 {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }
}
