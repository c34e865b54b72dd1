use bson::{doc, oid::ObjectId, DateTime, Document};
use devmeet_db::models::{Question, Session};
use mongodb::{Database, options::ReturnDocument};
use tracing::{info, warn};

use super::base::{BaseDao, DaoError, DaoResult};
use super::session::SessionDao;

pub struct QuestionDao {
    pub base: BaseDao<Question>,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionPatch {
    pub text: Option<String>,
    pub author: Option<String>,
    pub is_hand_raise: Option<bool>,
}

impl QuestionPatch {
    fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(v) = &self.text {
            set.insert("text", v.as_str());
        }
        if let Some(v) = &self.author {
            set.insert("author", v.as_str());
        }
        if let Some(v) = self.is_hand_raise {
            set.insert("is_hand_raise", v);
        }
        set
    }
}

impl QuestionDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Question::COLLECTION),
        }
    }

    /// Questions of one session, oldest first.
    pub async fn list_by_session(&self, session_id: ObjectId) -> DaoResult<Vec<Question>> {
        self.base
            .find_many(
                doc! { "session_id": session_id },
                Some(doc! { "created_at": 1, "_id": 1 }),
            )
            .await
    }

    pub async fn list_by_sessions(&self, session_ids: &[ObjectId]) -> DaoResult<Vec<Question>> {
        self.base
            .find_many(
                doc! { "session_id": { "$in": session_ids.to_vec() } },
                Some(doc! { "created_at": 1, "_id": 1 }),
            )
            .await
    }

    /// Inserts a question row. Only talk sessions take questions.
    pub async fn create(
        &self,
        sessions: &SessionDao,
        session_id: ObjectId,
        text: Option<String>,
        author: String,
        is_hand_raise: bool,
    ) -> DaoResult<Question> {
        require_talk(sessions, session_id).await?;

        let question = Question {
            id: None,
            session_id,
            text,
            author,
            is_hand_raise,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&question).await?;
        info!(question_id = %id, session_id = %session_id, is_hand_raise, "Question added");
        self.base.find_by_id(id).await
    }

    pub async fn ask(
        &self,
        sessions: &SessionDao,
        session_id: ObjectId,
        text: String,
        author: String,
    ) -> DaoResult<Question> {
        self.create(sessions, session_id, Some(text), author, false)
            .await
    }

    /// Raises `author`'s hand in the session. One raised-hand row per author:
    /// the first call inserts it, later calls return the same row.
    pub async fn raise_hand(
        &self,
        sessions: &SessionDao,
        session_id: ObjectId,
        author: String,
    ) -> DaoResult<Question> {
        require_talk(sessions, session_id).await?;

        let filter = doc! {
            "session_id": session_id,
            "author": author.as_str(),
            "is_hand_raise": true,
        };
        let update = doc! {
            "$setOnInsert": {
                "text": Question::HAND_RAISE_TEXT,
                "created_at": DateTime::now(),
            }
        };

        let mut attempt = 0;
        let question = loop {
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
                // A concurrent raise inserted the row first; the retry matches it.
                Err(e) if attempt == 1 && super::base::is_duplicate_key(&e) => {
                    warn!(session_id = %session_id, %author, "Concurrent hand raise, retrying");
                }
                Err(e) => return Err(DaoError::from_write(e)),
            }
        };

        info!(session_id = %session_id, %author, "Hand raised");
        Ok(question)
    }

    /// Lowers `author`'s hand and returns the removed row. `NotFound` when it was not raised.
    pub async fn lower_hand(&self, session_id: ObjectId, author: &str) -> DaoResult<Question> {
        let question = self
            .base
            .collection()
            .find_one_and_delete(doc! {
                "session_id": session_id,
                "author": author,
                "is_hand_raise": true,
            })
            .await?
            .ok_or(DaoError::NotFound)?;

        info!(session_id = %session_id, %author, "Hand lowered");
        Ok(question)
    }

    /// Flips the hand-raise flag on an existing row. Never inserts. Raising a
    /// second hand for an author fails with `DuplicateKey`.
    pub async fn toggle_hand_raise(&self, id: ObjectId) -> DaoResult<Question> {
        let pipeline = vec![doc! {
            "$set": {
                "is_hand_raise": { "$not": [{ "$ifNull": ["$is_hand_raise", false] }] }
            }
        }];

        self.base
            .collection()
            .find_one_and_update(doc! { "_id": id }, pipeline)
            .return_document(ReturnDocument::After)
            .await
            .map_err(DaoError::from_write)?
            .ok_or(DaoError::NotFound)
    }

    pub async fn update(&self, id: ObjectId, patch: &QuestionPatch) -> DaoResult<Question> {
        let set = patch.to_set_document();
        if !set.is_empty() {
            let result = self
                .base
                .collection()
                .update_one(doc! { "_id": id }, doc! { "$set": set })
                .await
                .map_err(DaoError::from_write)?;
            if result.matched_count == 0 {
                return Err(DaoError::NotFound);
            }
        }
        self.base.find_by_id(id).await
    }

    pub async fn remove(&self, id: ObjectId) -> DaoResult<Question> {
        let question = self.base.find_by_id(id).await?;
        self.base.delete_by_id(id).await?;
        Ok(question)
    }
}

async fn require_talk(sessions: &SessionDao, session_id: ObjectId) -> DaoResult<Session> {
    let session = sessions.base.find_by_id(session_id).await?;
    if !session.session_type.accepts_questions() {
        return Err(DaoError::Validation(format!(
            "{} sessions do not take questions",
            session.session_type.as_str()
        )));
    }
    Ok(session)
}
