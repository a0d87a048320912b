//! Runtime configuration, read from the process environment (and `.env`).

use std::path::PathBuf;

const DEFAULT_HISTORY_FILE: &str = "data/history.csv";

/// Configuration for the calculator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Deployment label, only reported in logs
    pub environment: String,
    /// History file used when a command is given no explicit path
    pub history_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            environment: "Development".to_string(),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            log_level: get("LOG_LEVEL")
                .map(|v| v.trim().to_uppercase())
                .unwrap_or(defaults.log_level),
            environment: get("ENVIRONMENT").unwrap_or(defaults.environment),
            history_file: get("CALC_HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.history_file),
        }
    }
}
