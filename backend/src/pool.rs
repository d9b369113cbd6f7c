//! Process-wide Postgres connection pool.
//!
//! A [`PoolManager`] is built once by the binary, initialised before Rocket
//! starts and handed to the routes through managed state. The underlying
//! pool is created at most once per manager; every checkout goes through
//! [`PoolManager::with_connection`] so the connection returns to the pool on
//! every exit path.

use std::sync::OnceLock;

use futures::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::{DatabaseConfig, PoolSettings};
use crate::error::StartupError;
use crate::queries::Queries;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Connection pool has not been initialized")]
    NotInitialized,
    #[error("Timed out waiting for a database connection")]
    Timeout,
    #[error("Connection pool is closed")]
    Closed,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PoolError {
    fn from_acquire(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => PoolError::Timeout,
            sqlx::Error::PoolClosed => PoolError::Closed,
            other => PoolError::Database(other),
        }
    }

    /// Whether a caller may reasonably retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, PoolError::Timeout | PoolError::Database(sqlx::Error::Io(_)))
    }
}

/// Point-in-time view of the pool, for logs and health output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
    pub max_size: u32,
    pub closed: bool,
}

#[derive(Debug)]
pub struct PoolManager {
    connect_options: PgConnectOptions,
    settings: PoolSettings,
    pool: OnceLock<PgPool>,
}

impl PoolManager {
    pub fn new(config: &DatabaseConfig, settings: PoolSettings) -> Self {
        Self::with_connect_options(config.connect_options(), settings)
    }

    pub fn with_connect_options(connect_options: PgConnectOptions, settings: PoolSettings) -> Self {
        Self {
            connect_options,
            settings,
            pool: OnceLock::new(),
        }
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.get().is_some()
    }

    /// Returns the pool, creating it on the first call.
    ///
    /// Connections are opened on demand, so this never blocks. It has to run
    /// inside the Tokio runtime because the pool spawns its maintenance task.
    pub fn pool(&self) -> &PgPool {
        self.pool.get_or_init(|| {
            info!(
                max_size = self.settings.max_size,
                min_idle = self.settings.min_idle,
                acquire_timeout_ms = self.settings.acquire_timeout.as_millis() as u64,
                "Creating connection pool"
            );
            self.settings
                .pool_options()
                .connect_lazy_with(self.connect_options.clone())
        })
    }

    /// Creates the pool if needed and makes sure the `votes` table exists.
    ///
    /// Safe to call more than once: the pool is reused and the DDL is
    /// `IF NOT EXISTS`. Any failure here must stop the process from serving.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<&PgPool, StartupError> {
        if self.is_initialized() {
            debug!("Connection pool already exists, reusing it");
        }
        let pool = self.pool();

        self.with_connection(|conn| Box::pin(Queries::create_votes_table(conn)))
            .await
            .map_err(StartupError::Schema)?;

        info!("📋 Votes table schema verified");
        Ok(pool)
    }

    /// Runs `op` on a single pooled connection.
    ///
    /// The connection is checked out for the duration of `op` only and goes
    /// back to the pool when this returns, whether `op` succeeded or not.
    /// Checkout waits at most the configured acquire timeout.
    pub async fn with_connection<T, F>(&self, op: F) -> Result<T, PoolError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, sqlx::Error>>,
    {
        let pool = self.pool.get().ok_or(PoolError::NotInitialized)?;

        let mut conn = pool.acquire().await.map_err(|e| {
            let err = PoolError::from_acquire(e);
            if matches!(err, PoolError::Timeout) {
                warn!(
                    timeout_ms = self.settings.acquire_timeout.as_millis() as u64,
                    "Connection pool timeout, all connections are busy"
                );
            }
            err
        })?;

        let result = op(&mut *conn).await;
        drop(conn);
        result.map_err(PoolError::Database)
    }

    /// Round trip through the pool.
    pub async fn health_check(&self) -> Result<(), PoolError> {
        self.with_connection(|conn| Box::pin(Queries::ping(conn))).await
    }

    pub fn status(&self) -> Option<PoolStatus> {
        self.pool.get().map(|pool| PoolStatus {
            size: pool.size(),
            idle: pool.num_idle(),
            max_size: self.settings.max_size,
            closed: pool.is_closed(),
        })
    }

    /// Closes every pooled connection. Does nothing if no pool was created.
    ///
    /// Checkouts still waiting when this runs fail with [`PoolError::Closed`].
    pub async fn shutdown(&self) {
        match self.pool.get() {
            Some(pool) => {
                info!("Closing connection pool");
                pool.close().await;
                info!("Connection pool closed");
            }
            None => debug!("No connection pool to close"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Nothing listens on port 1, so every connect attempt is refused.
    fn unreachable_manager(acquire_timeout: Duration) -> PoolManager {
        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("nobody")
            .database("nowhere");
        let settings = PoolSettings {
            max_size: 2,
            min_idle: 0,
            acquire_timeout,
            ..PoolSettings::default()
        };
        PoolManager::with_connect_options(options, settings)
    }

    #[tokio::test]
    async fn test_shutdown_without_pool_is_noop() {
        let manager = unreachable_manager(Duration::from_millis(200));
        manager.shutdown().await;
        assert!(!manager.is_initialized());
        assert_eq!(manager.status(), None);
    }

    #[tokio::test]
    async fn test_checkout_before_initialize_fails() {
        let manager = unreachable_manager(Duration::from_millis(200));
        let result = manager.with_connection(|conn| Box::pin(Queries::ping(conn))).await;
        assert!(matches!(result, Err(PoolError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_pool_is_created_once() {
        let manager = unreachable_manager(Duration::from_millis(200));
        let first: *const PgPool = manager.pool();
        let second: *const PgPool = manager.pool();
        assert!(std::ptr::eq(first, second));
        assert!(manager.is_initialized());
    }

    #[tokio::test]
    async fn test_checkout_is_bounded_by_acquire_timeout() {
        let manager = unreachable_manager(Duration::from_millis(300));
        manager.pool();

        let started = Instant::now();
        let result = manager.with_connection(|conn| Box::pin(Queries::ping(conn))).await;
        let elapsed = started.elapsed();

        let err = result.unwrap_err();
        assert!(matches!(err, PoolError::Timeout | PoolError::Database(_)), "{err:?}");
        assert!(elapsed < Duration::from_secs(5), "checkout took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_initialize_fails_on_unreachable_database() {
        let manager = unreachable_manager(Duration::from_millis(300));
        let result = manager.initialize().await;
        assert!(matches!(result, Err(StartupError::Schema(_))));
        // The pool itself stays installed so a retry reuses it.
        assert!(manager.is_initialized());
    }

    #[tokio::test]
    async fn test_checkout_after_shutdown_reports_closed() {
        let manager = unreachable_manager(Duration::from_millis(200));
        manager.pool();
        manager.shutdown().await;

        let status = manager.status().unwrap();
        assert!(status.closed);

        let result = manager.with_connection(|conn| Box::pin(Queries::ping(conn))).await;
        assert!(matches!(result, Err(PoolError::Closed)));
    }

    #[test]
    fn test_error_classification() {
        assert!(PoolError::Timeout.is_transient());
        assert!(!PoolError::Closed.is_transient());
        assert!(!PoolError::NotInitialized.is_transient());
        assert!(matches!(
            PoolError::from_acquire(sqlx::Error::PoolTimedOut),
            PoolError::Timeout
        ));
        assert!(matches!(
            PoolError::from_acquire(sqlx::Error::PoolClosed),
            PoolError::Closed
        ));
        assert!(matches!(
            PoolError::from_acquire(sqlx::Error::RowNotFound),
            PoolError::Database(_)
        ));
    }
}
