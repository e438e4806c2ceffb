//! Study-session state: the current topic and everything generated for it.
//!
//! The state lives behind a std mutex that is only held for short, synchronous
//! updates. AI calls happen between two lock scopes; their results are applied
//! only if the topic has not changed in the meantime.

pub mod actions;

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use crate::ai::AiError;
use crate::db::DbLockError;
use crate::domain::{
  MindMapNode, PersonalizedReview, QuizQuestion, QuizResult, ResourceItem, StudyPlan, Transcript,
};
use crate::srs::ReviewSession;

/// Long-running requests, at most one of each kind at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
  Plan,
  TopicContent,
  Rephrase,
  Analogy,
  Quiz,
  QuizAnalysis,
  PersonalizedReview,
  Flashcards,
  MindMap,
  Resources,
  Summary,
}

/// Explanation of one plan sub-topic
#[derive(Debug, Clone, Default, Serialize)]
pub struct TopicView {
  pub selected: Option<String>,
  pub content: Option<String>,
  pub analogy: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizState {
  pub questions: Vec<QuizQuestion>,
  pub answers: Vec<String>,
  pub result: Option<QuizResult>,
  pub analysis: Option<String>,
  pub review: Option<PersonalizedReview>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyState {
  pub topic: Option<String>,
  pub duration: Option<String>,
  pub plan: Option<StudyPlan>,
  pub topic_view: TopicView,
  pub chat: Transcript,
  pub interview: Transcript,
  pub quiz: Option<QuizState>,
  pub resources: Vec<ResourceItem>,
  pub summary: Option<String>,
  pub mind_map: Option<MindMapNode>,
  pub review: ReviewSession,
  pub error: Option<String>,
  pub in_flight: BTreeSet<Operation>,
  /// Bumped whenever a new topic replaces the old one
  #[serde(skip)]
  epoch: u64,
}

impl StudyState {
  /// Forget everything generated for the previous topic and start `topic`.
  pub fn reset_for_topic(&mut self, topic: String) {
    let in_flight = std::mem::take(&mut self.in_flight);
    let epoch = self.epoch + 1;
    *self = StudyState {
      topic: Some(topic),
      in_flight,
      epoch,
      ..StudyState::default()
    };
  }

  pub fn require_topic(&self) -> Result<&str, StudyError> {
    self.topic.as_deref().ok_or(StudyError::NoTopic)
  }

  pub fn is_busy(&self) -> bool {
    !self.in_flight.is_empty() || self.chat.is_pending() || self.interview.is_pending()
  }
}

#[derive(Debug, Error)]
pub enum StudyError {
  #[error("{0}")]
  Invalid(&'static str),

  #[error("Create a study plan first")]
  NoTopic,

  #[error("The {0} has not been started")]
  NotStarted(&'static str),

  #[error("A request of this kind is already running")]
  Busy,

  #[error("The topic changed while the request was running")]
  Stale,

  #[error("{0} not found")]
  NotFound(&'static str),

  #[error("{message}")]
  Service {
    message: String,
    #[source]
    source: AiError,
  },

  #[error("Storage error: {0}")]
  Storage(String),

  #[error("Study state unavailable")]
  Unavailable,
}

impl From<rusqlite::Error> for StudyError {
  fn from(e: rusqlite::Error) -> Self {
    tracing::warn!("Storage failure: {}", e);
    StudyError::Storage(e.to_string())
  }
}

impl From<DbLockError> for StudyError {
  fn from(e: DbLockError) -> Self {
    StudyError::Storage(e.to_string())
  }
}

/// Shared handle to the study state
#[derive(Clone, Default)]
pub struct StudyStore {
  inner: Arc<Mutex<StudyState>>,
}

impl StudyStore {
  fn lock(&self) -> Result<MutexGuard<'_, StudyState>, StudyError> {
    self.inner.lock().map_err(|_| {
      tracing::error!("Study state mutex poisoned");
      StudyError::Unavailable
    })
  }

  /// Run a synchronous update under the lock.
  pub fn with<R>(&self, f: impl FnOnce(&mut StudyState) -> R) -> Result<R, StudyError> {
    let mut state = self.lock()?;
    Ok(f(&mut state))
  }

  pub fn snapshot(&self) -> Result<StudyState, StudyError> {
    self.with(|s| s.clone())
  }

  /// Mark `op` in flight and clear the last error.
  ///
  /// `prepare` runs under the same lock, so it can validate state and clear
  /// stale output before the request starts.
  pub fn begin<R>(
    &self,
    op: Operation,
    prepare: impl FnOnce(&mut StudyState) -> Result<R, StudyError>,
  ) -> Result<(OperationGuard, R), StudyError> {
    let mut state = self.lock()?;
    if state.in_flight.contains(&op) {
      return Err(StudyError::Busy);
    }
    let prepared = prepare(&mut state)?;
    state.error = None;
    state.in_flight.insert(op);
    let guard = OperationGuard {
      store: self.clone(),
      op,
      epoch: state.epoch,
    };
    Ok((guard, prepared))
  }

  /// Apply a result unless the topic changed since `epoch`.
  pub fn apply<R>(&self, epoch: u64, f: impl FnOnce(&mut StudyState) -> R) -> Result<R, StudyError> {
    let mut state = self.lock()?;
    if state.epoch != epoch {
      tracing::debug!("Discarding result for a previous topic");
      return Err(StudyError::Stale);
    }
    Ok(f(&mut state))
  }

  /// Record a user-facing failure message for the current topic.
  pub fn fail(&self, epoch: u64, message: String, source: AiError) -> StudyError {
    tracing::warn!("{} ({})", message, source);
    let _ = self.apply(epoch, |s| s.error = Some(message.clone()));
    StudyError::Service { message, source }
  }
}

/// Clears the in-flight flag of an operation when dropped
pub struct OperationGuard {
  store: StudyStore,
  op: Operation,
  epoch: u64,
}

impl OperationGuard {
  pub fn apply<R>(&self, f: impl FnOnce(&mut StudyState) -> R) -> Result<R, StudyError> {
    self.store.apply(self.epoch, f)
  }

  pub fn fail(&self, message: String, source: AiError) -> StudyError {
    self.store.fail(self.epoch, message, source)
  }
}

impl Drop for OperationGuard {
  fn drop(&mut self) {
    if let Ok(mut state) = self.store.inner.lock() {
      state.in_flight.remove(&self.op);
    }
  }
}
