use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config;

/// A flashcard with its spaced-repetition scheduling state.
///
/// Serialized with the field names of the persisted deck record
/// (`nextReview`, `interval`, `easeFactor`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
  pub id: i64,
  pub term: String,
  pub definition: String,
  pub next_review: DateTime<Utc>,
  /// Days until the next review, always at least 1
  pub interval: u32,
  pub ease_factor: f64,
}

impl Flashcard {
  /// A card that has never been reviewed: due immediately.
  pub fn new(id: i64, term: String, definition: String, now: DateTime<Utc>) -> Self {
    Self {
      id,
      term,
      definition,
      next_review: now,
      interval: config::INITIAL_INTERVAL_DAYS,
      ease_factor: config::DEFAULT_EASE_FACTOR,
    }
  }

  pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
    self.next_review <= as_of
  }
}

/// Term/definition pair produced by content generation, not yet part of a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
  pub term: String,
  pub definition: String,
}

impl CardDraft {
  pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
    Self {
      term: term.into(),
      definition: definition.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  #[test]
  fn test_new_card_defaults() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let card = Flashcard::new(7, "Closure".into(), "A function with captured state".into(), now);

    assert_eq!(card.id, 7);
    assert_eq!(card.interval, 1);
    assert!((card.ease_factor - 2.5).abs() < f64::EPSILON);
    assert_eq!(card.next_review, now);
  }

  #[test]
  fn test_new_card_is_due_immediately() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let card = Flashcard::new(1, "Trait".into(), "Shared behaviour".into(), now);
    assert!(card.is_due(now));
    assert!(!card.is_due(now - Duration::seconds(1)));
  }

  #[test]
  fn test_serialized_field_names() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let card = Flashcard::new(3, "Borrow".into(), "A reference".into(), now);
    let json = serde_json::to_value(&card).unwrap();

    assert_eq!(json["term"], "Borrow");
    assert_eq!(json["interval"], 1);
    assert_eq!(json["easeFactor"], 2.5);
    assert_eq!(json["nextReview"], "2025-03-01T09:00:00Z");
  }
}
