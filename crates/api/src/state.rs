use devmeet_config::Settings;
use devmeet_services::{
    CatalogService,
    dao::{
        event::EventDao, feedback::FeedbackDao, question::QuestionDao, session::SessionDao,
    },
};
use mongodb::Database;
use std::sync::Arc;

use crate::ws::storage::WsStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub events: Arc<EventDao>,
    pub sessions: Arc<SessionDao>,
    pub questions: Arc<QuestionDao>,
    pub feedback: Arc<FeedbackDao>,
    pub catalog: Arc<CatalogService>,
    pub ws_storage: Arc<WsStorage>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let events = Arc::new(EventDao::new(&db));
        let sessions = Arc::new(SessionDao::new(&db));
        let questions = Arc::new(QuestionDao::new(&db));
        let feedback = Arc::new(FeedbackDao::new(&db));
        let catalog = Arc::new(CatalogService::new(
            events.clone(),
            sessions.clone(),
            questions.clone(),
            feedback.clone(),
        ));
        let ws_storage = Arc::new(WsStorage::new());

        Self {
            db,
            settings,
            events,
            sessions,
            questions,
            feedback,
            catalog,
            ws_storage,
        }
    }
}
