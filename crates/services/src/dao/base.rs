use bson::{doc, oid::ObjectId, Document};
use mongodb::{
    Collection, Database,
    error::{ErrorKind, WriteFailure},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Validation: {0}")]
    Validation(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// True when the server rejected a write because of a unique index.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(ref command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Combines `$set` and `$unset` into one update, leaving out empty operators.
/// An empty result means there is nothing to write.
pub(crate) fn set_unset(set: Document, unset: Document) -> Document {
    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

impl DaoError {
    pub(crate) fn from_write(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            return DaoError::DuplicateKey(err.to_string());
        }
        DaoError::Mongo(err)
    }
}

pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<T> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn exists(&self, filter: Document) -> DaoResult<bool> {
        Ok(self.count(filter).await? > 0)
    }

    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> DaoResult<Vec<T>> {
        use futures::TryStreamExt;

        let cursor = if let Some(sort) = sort {
            self.collection.find(filter).sort(sort).await?
        } else {
            self.collection.find(filter).await?
        };

        Ok(cursor.try_collect().await?)
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<ObjectId> {
        let result = self
            .collection
            .insert_one(doc)
            .await
            .map_err(DaoError::from_write)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DaoError::Validation("inserted_id is not an ObjectId".to_string()))?;
        debug!(collection = %self.collection.name(), ?id, "Inserted document");
        Ok(id)
    }

    /// Applies `update` to the first match. Returns whether anything matched.
    ///
    /// `updated_at` is stamped into `$set`. Pipeline updates go through [`collection`](Self::collection).
    pub async fn update_one(&self, filter: Document, update: Document) -> DaoResult<bool> {
        let mut final_update = update;
        if let Ok(set_doc) = final_update.get_document_mut("$set") {
            set_doc.insert("updated_at", bson::DateTime::now());
        } else {
            final_update.insert("$set", doc! { "updated_at": bson::DateTime::now() });
        }

        let result = self
            .collection
            .update_one(filter, final_update)
            .await
            .map_err(DaoError::from_write)?;
        Ok(result.matched_count > 0)
    }

    /// Like [`update_one`](Self::update_one) but reports a missing row as `NotFound`.
    pub async fn update_by_id(&self, id: ObjectId, update: Document) -> DaoResult<()> {
        if self.update_one(doc! { "_id": id }, update).await? {
            Ok(())
        } else {
            Err(DaoError::NotFound)
        }
    }

    pub async fn delete_by_id(&self, id: ObjectId) -> DaoResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(DaoError::NotFound);
        }
        debug!(collection = %self.collection.name(), ?id, "Deleted document");
        Ok(())
    }

    pub async fn hard_delete(&self, filter: Document) -> DaoResult<u64> {
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    pub async fn count(&self, filter: Document) -> DaoResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }
}
