pub mod flashcards;
pub mod schema;
pub mod settings;
pub mod streak;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// Re-export all public items from submodules
pub use flashcards::*;
pub use schema::run_migrations;
pub use settings::*;
pub use streak::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        self.log_warn(context).unwrap_or_default()
    }
}

/// Error returned when the database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database unavailable")
    }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
    pool.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
        DbLockError
    })
}

/// Open (creating if needed) the database at `path` and bring its schema up to date.
pub fn init_db(path: &Path) -> Result<DbPool> {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Could not create data directory {}: {}", parent.display(), e);
        }
    }

    // Create backup before migrations if database exists
    if path.exists() {
        let backup_path = path.with_extension("db.backup");
        if let Err(e) = std::fs::copy(path, &backup_path) {
            tracing::warn!("Could not create database backup: {}", e);
        }
    }

    let conn = Connection::open(path)?;
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// In-memory database with the full schema
pub fn open_in_memory() -> Result<DbPool> {
    let conn = Connection::open_in_memory()?;
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}
