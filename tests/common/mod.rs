//! Shared setup for HTTP tests: an in-memory database and a canned text model.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use study_coach::ai::{AiError, Completion, GenerateRequest, TextModel, TextStream};
use study_coach::db;
use study_coach::domain::ResourceItem;
use study_coach::routes;
use study_coach::state::AppState;

pub const PLAN_JSON: &str = r#"[
  {"day": 1, "topic": "Foundations", "objective": "Get started", "tasks": ["Read the intro", "Set up tools"]},
  {"day": 2, "topic": "Practice", "objective": "Apply it", "tasks": ["Solve exercises"]}
]"#;

pub enum Reply {
  Text(&'static str),
  Sources(Vec<ResourceItem>),
  Fail,
}

/// Hands out replies in order; streamed replies are split on spaces.
pub struct CannedModel {
  replies: Mutex<VecDeque<Reply>>,
  pub prompts: Mutex<Vec<String>>,
}

impl CannedModel {
  fn next(&self, request: &GenerateRequest) -> Option<Reply> {
    if let Some(last) = request.contents.last() {
      self.prompts.lock().unwrap().push(last.text.clone());
    }
    self.replies.lock().unwrap().pop_front()
  }
}

#[async_trait]
impl TextModel for CannedModel {
  async fn generate(&self, request: GenerateRequest) -> Result<Completion, AiError> {
    match self.next(&request) {
      Some(Reply::Text(text)) => Ok(Completion::text(text)),
      Some(Reply::Sources(sources)) => Ok(Completion {
        text: String::new(),
        sources,
      }),
      Some(Reply::Fail) | None => Err(AiError::Transport("connection refused".into())),
    }
  }

  async fn stream(&self, request: GenerateRequest) -> Result<TextStream, AiError> {
    match self.next(&request) {
      Some(Reply::Text(text)) => {
        let chunks: Vec<Result<String, AiError>> =
          text.split_inclusive(' ').map(|c| Ok(c.to_string())).collect();
        Ok(Box::pin(stream::iter(chunks)))
      }
      _ => Err(AiError::Transport("connection refused".into())),
    }
  }
}

pub fn server(replies: Vec<Reply>) -> (TestServer, Arc<CannedModel>) {
  let model = Arc::new(CannedModel {
    replies: Mutex::new(replies.into()),
    prompts: Mutex::new(Vec::new()),
  });
  let pool = db::open_in_memory().unwrap();
  let state = AppState::new(pool, model.clone());
  (TestServer::new(routes::app(state)).unwrap(), model)
}

pub async fn create_plan(server: &TestServer, topic: &str) {
  server
    .post("/plan")
    .form(&[("topic", topic), ("duration", "2 days")])
    .await
    .assert_status(StatusCode::SEE_OTHER);
}
