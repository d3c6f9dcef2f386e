//! Rollup runtime configuration from environment variables

use std::env;

/// Configuration for the rollup runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RollupConfig {
    /// Path to SQLite database file
    pub db_path: String,

    /// Delay between rollup ticks in milliseconds
    pub interval_ms: u64,

    /// Sites aggregated concurrently within one tick
    pub max_concurrent_sites: usize,

    /// Run a single tick and exit
    pub run_once: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl RollupConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `BROWSERSTAT_DB_PATH` (default: data/browserstat.db)
    /// - `ROLLUP_INTERVAL_MS` (default: 300000)
    /// - `ROLLUP_MAX_CONCURRENT_SITES` (default: 4)
    /// - `ROLLUP_RUN_ONCE` (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading through `lookup` instead of the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            db_path: lookup("BROWSERSTAT_DB_PATH")
                .unwrap_or_else(|| "data/browserstat.db".to_string()),

            interval_ms: lookup("ROLLUP_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(300_000),

            max_concurrent_sites: lookup("ROLLUP_MAX_CONCURRENT_SITES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),

            run_once: lookup("ROLLUP_RUN_ONCE")
                .and_then(|s| s.to_lowercase().parse().ok())
                .unwrap_or(false),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.is_empty() {
            return Err(ConfigError::InvalidValue(
                "BROWSERSTAT_DB_PATH cannot be empty".to_string(),
            ));
        }

        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "ROLLUP_INTERVAL_MS must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrent_sites == 0 {
            return Err(ConfigError::InvalidValue(
                "ROLLUP_MAX_CONCURRENT_SITES must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
