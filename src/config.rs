//! Application configuration.
//!
//! Values are resolved once at startup with priority
//! `config.toml` > environment (including `.env`) > defaults.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== File Format ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
    ai: Option<AiFileConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct AiFileConfig {
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

// ==================== Resolved Configuration ====================

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub server_addr: String,
    pub server_port: u16,
    pub ai: AiSettings,
}

#[derive(Clone)]
pub struct AiSettings {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Only ever read from the environment
    pub api_key: Option<String>,
}

impl std::fmt::Debug for AiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiSettings")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl Config {
    /// Full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}

/// Load configuration from `config.toml`, the environment and `.env`.
pub fn load() -> Config {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let file = std::fs::read_to_string("config.toml").ok();
    load_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Resolve configuration from optional config.toml contents and an environment lookup.
pub fn load_from<F>(toml_contents: Option<&str>, env: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let file = match toml_contents.map(toml::from_str::<AppConfig>) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            tracing::warn!("Ignoring invalid config.toml: {}", e);
            AppConfig::default()
        }
        None => AppConfig::default(),
    };

    let database_path = match file.database.and_then(|d| d.path) {
        Some(path) => {
            tracing::info!("Using database from config.toml: {}", path);
            PathBuf::from(path)
        }
        None => match env("DATABASE_PATH") {
            Some(path) => {
                tracing::info!("Using database from DATABASE_PATH env: {}", path);
                PathBuf::from(path)
            }
            None => PathBuf::from(paths::db_path()),
        },
    };

    let (file_addr, file_port) = match file.server {
        Some(s) => (s.addr, s.port),
        None => (None, None),
    };
    let server_addr = file_addr.unwrap_or_else(|| SERVER_ADDR.to_string());
    let server_port = file_port
        .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
        .unwrap_or(SERVER_PORT);

    let ai_file = file.ai;
    let (file_model, file_base_url, file_timeout) = match ai_file {
        Some(a) => (a.model, a.base_url, a.timeout_secs),
        None => (None, None, None),
    };

    let ai = AiSettings {
        model: file_model
            .or_else(|| env("AI_MODEL"))
            .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
        base_url: file_base_url
            .or_else(|| env("AI_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string()),
        timeout_secs: file_timeout.unwrap_or(DEFAULT_AI_TIMEOUT_SECS),
        api_key: env("API_KEY")
            .or_else(|| env("GEMINI_API_KEY"))
            .filter(|k| !k.trim().is_empty()),
    };

    if ai.api_key.is_none() {
        tracing::warn!("API_KEY is not set; AI features will report an error until it is configured");
    }

    Config {
        database_path,
        server_addr,
        server_port,
        ai,
    }
}

// ==================== Server Configuration ====================

/// Default address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

// ==================== AI Configuration ====================

pub const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";

pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Request timeout for non-streaming and streaming calls alike
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 120;

// ==================== Study Configuration ====================

/// Number of questions in a generated quiz
pub const QUIZ_QUESTION_COUNT: usize = 5;

/// Levels kept when a generated mind map is accepted
pub const MIND_MAP_MAX_DEPTH: usize = 4;

/// Completed tasks shown on the progress page
pub const RECENT_TASKS_LIMIT: usize = 5;

// ==================== SRS Defaults ====================

/// Interval in days of a card that has never been reviewed
pub const INITIAL_INTERVAL_DAYS: u32 = 1;

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = load_from(None, env_of(&[]));
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.ai.model, "gemini-2.5-flash");
        assert_eq!(config.ai.timeout_secs, 120);
        assert!(config.ai.api_key.is_none());
        assert!(config.database_path.ends_with("study.db"));
    }

    #[test]
    fn test_env_overrides_defaults() {
        let env = env_of(&[
            ("DATABASE_PATH", "/tmp/other.db"),
            ("PORT", "8080"),
            ("AI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_API_KEY", "secret"),
        ]);
        let config = load_from(None, env);
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.ai.model, "gemini-2.5-pro");
        assert_eq!(config.ai.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_file_beats_env() {
        let toml = r#"
            [database]
            path = "file.db"

            [server]
            port = 4000

            [ai]
            model = "from-file"
            timeout_secs = 30
        "#;
        let env = env_of(&[("DATABASE_PATH", "env.db"), ("PORT", "5000"), ("AI_MODEL", "from-env")]);
        let config = load_from(Some(toml), env);
        assert_eq!(config.database_path, PathBuf::from("file.db"));
        assert_eq!(config.server_port, 4000);
        assert_eq!(config.ai.model, "from-file");
        assert_eq!(config.ai.timeout_secs, 30);
    }

    #[test]
    fn test_api_key_prefers_api_key_and_ignores_blank() {
        let config = load_from(None, env_of(&[("API_KEY", "a"), ("GEMINI_API_KEY", "b")]));
        assert_eq!(config.ai.api_key.as_deref(), Some("a"));

        let blank = load_from(None, env_of(&[("API_KEY", "  ")]));
        assert!(blank.ai.api_key.is_none());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let config = load_from(Some("not [valid toml"), env_of(&[("PORT", "3100")]));
        assert_eq!(config.server_port, 3100);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = load_from(None, env_of(&[("API_KEY", "hunter2")]));
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
    }
}
