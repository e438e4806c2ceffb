//! Persisted study streak (settings key `study_streak`)

use chrono::NaiveDate;
use rusqlite::{Connection, Result};

use super::settings::{delete_setting, get_setting, set_setting};
use crate::domain::StreakRecord;

pub const STREAK_KEY: &str = "study_streak";

/// Current streak length as of `today`.
///
/// A lapsed or unreadable record is removed and reported as 0.
pub fn load_streak(conn: &Connection, today: NaiveDate) -> Result<u32> {
    let Some(raw) = get_setting(conn, STREAK_KEY)? else {
        return Ok(0);
    };

    match serde_json::from_str::<StreakRecord>(&raw) {
        Ok(record) if record.is_current(today) => Ok(record.count),
        Ok(_) => {
            tracing::debug!("Streak lapsed, clearing");
            delete_setting(conn, STREAK_KEY)?;
            Ok(0)
        }
        Err(e) => {
            tracing::warn!("Discarding unreadable streak record: {}", e);
            delete_setting(conn, STREAK_KEY)?;
            Ok(0)
        }
    }
}

/// Record a task completion on `today` and return the new streak length.
pub fn record_task_completion(conn: &Connection, today: NaiveDate) -> Result<u32> {
    let previous = get_setting(conn, STREAK_KEY)?
        .and_then(|raw| serde_json::from_str::<StreakRecord>(&raw).ok());
    let record = StreakRecord::complete(previous, today);

    if previous != Some(record) {
        let json = serde_json::to_string(&record)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        set_setting(conn, STREAK_KEY, &json)?;
    }
    Ok(record.count)
}
