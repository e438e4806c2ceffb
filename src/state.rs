//! Application state shared by all handlers.

use std::sync::Arc;

use crate::ai::{ContentService, TextModel};
use crate::db::DbPool;
use crate::study::StudyStore;

#[derive(Clone)]
pub struct AppState {
    /// Current topic and everything generated for it
    pub study: StudyStore,

    /// Decks and the streak record
    pub db: DbPool,

    pub ai: ContentService,
}

impl AppState {
    pub fn new(db: DbPool, model: Arc<dyn TextModel>) -> Self {
        Self {
            study: StudyStore::default(),
            db,
            ai: ContentService::new(model),
        }
    }
}
