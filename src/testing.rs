//! Test utilities for database setup and a scripted text model.
//!
//! Reuses the real migrations so test schemas never drift from production.

use async_trait::async_trait;
use futures::stream;
use rusqlite::Connection;
use std::collections::VecDeque;
use std::sync::Mutex;
use tempfile::TempDir;

use crate::ai::{AiError, Completion, GenerateRequest, TextModel, TextStream};

/// Temporary SQLite database with the full schema.
///
/// The directory (and database file) is removed when dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("study.db"))?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }
}

/// Replies handed out in order by [`ScriptedModel`]
pub enum Scripted {
    Text(String),
    Chunks(Vec<String>),
    Fail(AiError),
}

/// Text model that replays canned replies and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Scripted>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Scripted>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn next(&self, request: GenerateRequest) -> Scripted {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Fail(AiError::Empty))
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, request: GenerateRequest) -> Result<Completion, AiError> {
        match self.next(request) {
            Scripted::Text(text) => Ok(Completion::text(text)),
            Scripted::Chunks(chunks) => Ok(Completion::text(chunks.concat())),
            Scripted::Fail(e) => Err(e),
        }
    }

    async fn stream(&self, request: GenerateRequest) -> Result<TextStream, AiError> {
        match self.next(request) {
            Scripted::Text(text) => Ok(Box::pin(stream::iter(vec![Ok(text)]))),
            Scripted::Chunks(chunks) => Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok)))),
            Scripted::Fail(e) => Err(e),
        }
    }
}
