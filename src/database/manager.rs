use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Non unique result: {0}")]
    NonUnique(String),

    #[error("Already exists: {0}")]
    Duplicate(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Process-wide connection pool, created on first use from `DATABASE_URL`.
pub struct DatabaseManager {
    pool: RwLock<Option<PgPool>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: RwLock::new(None),
        })
    }

    /// Get the shared pool, connecting lazily
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();

        // Fast path: try read lock
        {
            let pool = manager.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut slot = manager.pool.write().await;
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        let connection_string = Self::connection_string()?;
        let settings = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connection_timeout))
            .connect(&connection_string)
            .await?;

        *slot = Some(pool.clone());
        info!("Created database pool (max {} connections)", settings.max_connections);
        Ok(pool)
    }

    fn connection_string() -> Result<String, DatabaseError> {
        let base = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
        Self::validate_connection_string(&base)
    }

    fn validate_connection_string(base: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Apply the bundled migrations
    pub async fn migrate() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close_all() {
        let mut slot = Self::instance().pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
