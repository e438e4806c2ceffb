//! Ease-factor interval scheduling for flashcard reviews.

use chrono::{DateTime, Days, Duration, TimeZone, Utc};

use crate::domain::{Flashcard, ReviewGrade};

/// Interval multiplier damping applied on a "Good" answer
pub const GOOD_DAMPING: f64 = 0.8;

/// Ease factor increase on an "Easy" answer
pub const EASY_BONUS: f64 = 0.15;

/// `now` plus `days` calendar days in the timezone of `now`.
///
/// Falls back to whole 24-hour days when the calendar date cannot be
/// resolved, and saturates at the latest representable instant.
pub fn add_days<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> DateTime<Utc> {
  if let Some(next) = now.clone().checked_add_days(Days::new(u64::from(days))) {
    return next.with_timezone(&Utc);
  }
  Duration::try_days(i64::from(days))
    .and_then(|d| now.clone().checked_add_signed(d))
    .map(|next| next.with_timezone(&Utc))
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn scaled_interval(interval: u32, factor: f64) -> u32 {
  // float to int casts saturate
  ((f64::from(interval) * factor).ceil() as u32).max(1)
}

/// Apply a review grade to a card and return the rescheduled card.
pub fn record_review<Tz: TimeZone>(card: &Flashcard, grade: ReviewGrade, now: &DateTime<Tz>) -> Flashcard {
  let (interval, ease_factor) = match grade {
    ReviewGrade::Hard => (1, card.ease_factor),
    ReviewGrade::Good => (
      scaled_interval(card.interval, card.ease_factor * GOOD_DAMPING),
      card.ease_factor,
    ),
    ReviewGrade::Easy => (
      scaled_interval(card.interval, card.ease_factor),
      card.ease_factor + EASY_BONUS,
    ),
  };

  Flashcard {
    interval,
    ease_factor,
    next_review: add_days(now, interval),
    ..card.clone()
  }
}
