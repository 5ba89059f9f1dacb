//! # Configuration
//!
//! Database and numbering settings.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults:
//!
//! | Variable                        | Default            |
//! |---------------------------------|--------------------|
//! | `HOMEBASE_DB_PATH`              | `./homebase.db`    |
//! | `HOMEBASE_DB_MAX_CONNECTIONS`   | `5`                |
//! | `HOMEBASE_DB_BUSY_TIMEOUT_MS`   | `5000`             |
//! | `HOMEBASE_INVOICE_PREFIX`       | `INV`              |
//! | `HOMEBASE_ESTIMATE_PREFIX`      | (empty)            |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use homebase_core::NumberingConfig;

// =============================================================================
// Database Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/homebase.db")
///     .max_connections(5)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Pool acquire timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long a connection waits for SQLite's write lock.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the pool acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the SQLite busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Everything the billing layer needs at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DbConfig,
    pub numbering: NumberingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("HOMEBASE_DB_PATH").unwrap_or_else(|| "./homebase.db".to_string());

        let max_connections: u32 = lookup("HOMEBASE_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HOMEBASE_DB_MAX_CONNECTIONS".to_string()))?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "HOMEBASE_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        let busy_timeout_ms: u64 = lookup("HOMEBASE_DB_BUSY_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HOMEBASE_DB_BUSY_TIMEOUT_MS".to_string()))?;

        let defaults = NumberingConfig::default();
        let numbering = NumberingConfig {
            invoice_prefix: lookup("HOMEBASE_INVOICE_PREFIX").unwrap_or(defaults.invoice_prefix),
            estimate_prefix: lookup("HOMEBASE_ESTIMATE_PREFIX").unwrap_or(defaults.estimate_prefix),
        };

        numbering
            .validate()
            .map_err(|e| ConfigError::InvalidPrefix(e.to_string()))?;

        let database = DbConfig::new(path)
            .max_connections(max_connections)
            .min_connections(1)
            .busy_timeout(Duration::from_millis(busy_timeout_ms));

        Ok(Config {
            database,
            numbering,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid document number prefix: {0}")]
    InvalidPrefix(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database.database_path, PathBuf::from("./homebase.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.busy_timeout, Duration::from_secs(5));
        assert_eq!(config.numbering, NumberingConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("HOMEBASE_DB_PATH", "/tmp/hb.db"),
            ("HOMEBASE_DB_MAX_CONNECTIONS", "8"),
            ("HOMEBASE_DB_BUSY_TIMEOUT_MS", "250"),
            ("HOMEBASE_INVOICE_PREFIX", "F"),
            ("HOMEBASE_ESTIMATE_PREFIX", "OFF"),
        ]))
        .unwrap();

        assert_eq!(config.database.database_path, PathBuf::from("/tmp/hb.db"));
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.database.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.numbering.invoice_prefix, "F");
        assert_eq!(config.numbering.estimate_prefix, "OFF");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("HOMEBASE_DB_MAX_CONNECTIONS", "many")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("HOMEBASE_DB_MAX_CONNECTIONS", "0")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("HOMEBASE_INVOICE_PREFIX", "IN%")])),
            Err(ConfigError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn test_db_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_millis(100));

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_millis(100));
    }
}
