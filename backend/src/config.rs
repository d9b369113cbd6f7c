use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

pub const ENV_INSTANCE: &str = "INSTANCE_CONNECTION_NAME";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASS: &str = "DB_PASS";
pub const ENV_DB_PORT: &str = "DB_PORT";

/// Directory the Cloud SQL proxy exposes instance sockets under.
pub const CLOUD_SQL_SOCKET_ROOT: &str = "/cloudsql";
const DEFAULT_PORT: u16 = 5432;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    Tcp { host: String, port: u16 },
    /// Cloud SQL connection name (`project:region:instance`), reached through
    /// the proxy's Unix socket directory.
    CloudSql { instance: String },
}

impl DbTarget {
    pub fn parse(instance: &str, port: u16) -> Self {
        if instance.contains(':') {
            DbTarget::CloudSql { instance: instance.to_string() }
        } else {
            DbTarget::Tcp { host: instance.to_string(), port }
        }
    }

    pub fn socket_dir(&self) -> Option<PathBuf> {
        match self {
            DbTarget::CloudSql { instance } => {
                Some(PathBuf::from(CLOUD_SQL_SOCKET_ROOT).join(instance))
            }
            DbTarget::Tcp { .. } => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub target: DbTarget,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("target", &self.target)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl DatabaseConfig {
    /// Reads the connection settings from the process environment, loading a
    /// `.env` file first when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let instance = required(ENV_INSTANCE)?;
        let database = required(ENV_DB_NAME)?;
        let user = required(ENV_DB_USER)?;
        let password = required(ENV_DB_PASS)?;

        let port = match lookup(ENV_DB_PORT) {
            Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::Invalid { var: ENV_DB_PORT, reason: e.to_string() }
            })?,
            _ => DEFAULT_PORT,
        };

        Ok(Self {
            target: DbTarget::parse(instance.trim(), port),
            database,
            user,
            password,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .database(&self.database)
            .username(&self.user)
            .password(&self.password);

        if let Some(dir) = self.target.socket_dir() {
            return options.socket(dir);
        }
        match &self.target {
            DbTarget::Tcp { host, port } => options.host(host).port(*port),
            DbTarget::CloudSql { .. } => options,
        }
    }
}

/// Pool tuning. `Default` carries the production values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_size: u32,
    pub min_idle: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 5,
            min_idle: 5,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(10 * 60),
            max_lifetime: Duration::from_secs(30 * 60),
        }
    }
}

impl PoolSettings {
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_size)
            .min_connections(self.min_idle.min(self.max_size))
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(Some(self.idle_timeout))
            .max_lifetime(Some(self.max_lifetime))
            .test_before_acquire(true)
    }
}
