//! Database connection and operations

pub mod films;
pub mod schema_sync;
pub mod sqlite_helpers;

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use films::{
    CastMember, CreateFilm, Film, FilmRepository, Genre, NewCastMember, NewTitle, Title,
    UpdateFilm,
};
pub use schema_sync::{SchemaSyncResult, sync_schema};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new database connection pool.
    ///
    /// Accepts a `sqlite:` URL or a plain file path; the file is created if missing.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let url = if url.starts_with("sqlite:") {
            url.to_string()
        } else {
            format!("sqlite://{}", url)
        };

        let options = SqliteConnectOptions::from_str(&url)
            .with_context(|| format!("Invalid database URL: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests.
    ///
    /// Pinned to a single connection that never expires, because every new connection
    /// to `sqlite::memory:` would open an empty database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a film repository
    pub fn films(&self) -> FilmRepository {
        FilmRepository::new(self.pool.clone())
    }

    /// Create missing tables
    pub async fn sync_schema(&self) -> Result<SchemaSyncResult> {
        let result = sync_schema(&self.pool)
            .await
            .context("Failed to synchronize schema")?;
        if !result.is_ok() {
            anyhow::bail!("Schema sync failed: {}", result.errors.join("; "));
        }
        Ok(result)
    }
}
