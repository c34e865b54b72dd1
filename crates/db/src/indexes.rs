use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{Event, Question, Session, SessionFeedback};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Events
    create_indexes(
        db,
        Event::COLLECTION,
        vec![
            index(bson::doc! { "category": 1 }),
            index(bson::doc! { "is_live": 1 }),
        ],
    )
    .await?;

    // Sessions
    create_indexes(
        db,
        Session::COLLECTION,
        vec![index(bson::doc! { "event_id": 1, "start_time": 1 })],
    )
    .await?;

    // Questions
    create_indexes(
        db,
        Question::COLLECTION,
        vec![
            index(bson::doc! { "session_id": 1, "created_at": 1 }),
            // At most one raised hand per author and session
            index_partial_unique(
                bson::doc! { "session_id": 1, "author": 1 },
                bson::doc! { "is_hand_raise": true },
            ),
        ],
    )
    .await?;

    // Feedback: one row per session
    create_indexes(
        db,
        SessionFeedback::COLLECTION,
        vec![index_unique(bson::doc! { "session_id": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn index_partial_unique(keys: bson::Document, filter: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(true)
                .partial_filter_expression(filter)
                .build(),
        )
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
