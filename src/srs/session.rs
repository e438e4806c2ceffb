//! Review session over a snapshot of due cards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{record_review, select_due};
use crate::domain::{Flashcard, ReviewGrade};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionState {
  #[default]
  Idle,
  Reviewing { index: usize },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewSession {
  queue: Vec<Flashcard>,
  state: SessionState,
}

impl ReviewSession {
  pub fn state(&self) -> SessionState {
    self.state
  }

  pub fn is_active(&self) -> bool {
    matches!(self.state, SessionState::Reviewing { .. })
  }

  /// Snapshot the due cards and begin reviewing.
  ///
  /// Returns false and stays idle when nothing is due.
  pub fn start(&mut self, deck: &[Flashcard], now: DateTime<Utc>) -> bool {
    self.start_with_queue(select_due(deck, now))
  }

  pub fn start_with_queue(&mut self, queue: Vec<Flashcard>) -> bool {
    if queue.is_empty() {
      self.end();
      return false;
    }
    self.queue = queue;
    self.state = SessionState::Reviewing { index: 0 };
    true
  }

  pub fn current(&self) -> Option<&Flashcard> {
    match self.state {
      SessionState::Reviewing { index } => self.queue.get(index),
      SessionState::Idle => None,
    }
  }

  /// 1-based position and queue length, while reviewing
  pub fn position(&self) -> Option<(usize, usize)> {
    match self.state {
      SessionState::Reviewing { index } => Some((index + 1, self.queue.len())),
      SessionState::Idle => None,
    }
  }

  /// Grade the current card and move on. Returns the rescheduled card, which
  /// the caller persists; the session goes idle after the last card.
  pub fn grade(&mut self, grade: ReviewGrade, now: DateTime<Utc>) -> Option<Flashcard> {
    let SessionState::Reviewing { index } = self.state else {
      return None;
    };
    let updated = record_review(self.queue.get(index)?, grade, &now);
    self.queue[index] = updated.clone();

    if index + 1 < self.queue.len() {
      self.state = SessionState::Reviewing { index: index + 1 };
    } else {
      self.end();
    }
    Some(updated)
  }

  pub fn end(&mut self) {
    self.queue.clear();
    self.state = SessionState::Idle;
  }
}
