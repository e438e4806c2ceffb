//! Consecutive-day study streak.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
  pub count: u32,
  pub last_completed_date: NaiveDate,
}

fn yesterday(today: NaiveDate) -> Option<NaiveDate> {
  today.checked_sub_days(Days::new(1))
}

impl StreakRecord {
  /// A streak is still alive when the last completion was today or yesterday.
  pub fn is_current(&self, today: NaiveDate) -> bool {
    self.last_completed_date == today || Some(self.last_completed_date) == yesterday(today)
  }

  /// Record a completed task on `today`.
  pub fn complete(previous: Option<StreakRecord>, today: NaiveDate) -> StreakRecord {
    let count = match previous {
      Some(p) if p.last_completed_date == today => return p,
      Some(p) if Some(p.last_completed_date) == yesterday(today) => p.count.saturating_add(1),
      _ => 1,
    };
    StreakRecord {
      count,
      last_completed_date: today,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn record(count: u32, last: NaiveDate) -> StreakRecord {
    StreakRecord {
      count,
      last_completed_date: last,
    }
  }

  #[test]
  fn test_first_completion_starts_at_one() {
    let today = date(2025, 5, 10);
    assert_eq!(StreakRecord::complete(None, today), record(1, today));
  }

  #[test]
  fn test_same_day_is_noop() {
    let today = date(2025, 5, 10);
    assert_eq!(StreakRecord::complete(Some(record(4, today)), today), record(4, today));
  }

  #[test]
  fn test_next_day_extends() {
    let prev = record(4, date(2025, 2, 28));
    assert_eq!(StreakRecord::complete(Some(prev), date(2025, 3, 1)), record(5, date(2025, 3, 1)));
  }

  #[test]
  fn test_gap_resets() {
    let prev = record(9, date(2025, 5, 7));
    assert_eq!(StreakRecord::complete(Some(prev), date(2025, 5, 10)), record(1, date(2025, 5, 10)));
  }

  #[test]
  fn test_is_current() {
    let today = date(2025, 1, 1);
    assert!(record(2, today).is_current(today));
    assert!(record(2, date(2024, 12, 31)).is_current(today));
    assert!(!record(2, date(2024, 12, 30)).is_current(today));
  }

  #[test]
  fn test_json_shape() {
    let json = serde_json::to_string(&record(3, date(2025, 4, 2))).unwrap();
    assert_eq!(json, r#"{"count":3,"lastCompletedDate":"2025-04-02"}"#);
  }
}
