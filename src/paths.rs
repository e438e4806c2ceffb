//! Project path functions - single source of truth for file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `PORT`: Override the server port (see config.rs)
//!
//! This allows running isolated server instances side by side:
//! ```bash
//! DATA_DIR=data/test PORT=3001 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path used when nothing else is configured
pub fn db_path() -> String {
    format!("{}/study.db", data_dir())
}

/// Static assets served under /static
pub const STATIC_DIR: &str = "static";
