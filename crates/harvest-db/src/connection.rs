//! Database connection management.
//!
//! Provides a `Storage` wrapper around a `SQLx` SQLite pool that handles
//! schema initialization and directory creation.

use crate::error::{Result, StorageError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// SQLite-backed storage sink for canonical records.
#[derive(Debug)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    /// Open (or create) a database at the given path.
    ///
    /// Parent directories are created when missing. Pass `:memory:` for an
    /// in-memory database, used by tests.
    ///
    /// # Errors
    /// Returns `StorageError` if the database cannot be opened or the
    /// schema cannot be initialized.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| StorageError::Open("database path is not valid UTF-8".to_string()))?;

        if path_str != ":memory:" {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| StorageError::Open(format!("invalid connection string: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| StorageError::Open(format!("failed to connect: {e}")))?;

        let storage = Self { pool };
        storage.init_schema().await?;

        tracing::info!("Storage opened at {}", path_str);
        Ok(storage)
    }

    /// Open an in-memory database, for tests.
    pub async fn in_memory() -> Result<Self> {
        Self::open(":memory:").await
    }

    /// Get a reference to the underlying `SQLx` pool.
    ///
    /// This allows consumers to execute queries directly using `SQLx`.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Storage pool closed");
    }

    /// Create the businesses table and its indexes when missing.
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS businesses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT,
                address TEXT,
                website TEXT,
                rating REAL DEFAULT 0.0,
                reviews_count INTEGER DEFAULT 0,
                category TEXT,
                hours TEXT,
                latitude REAL,
                longitude REAL,
                place_id TEXT UNIQUE,
                sources TEXT,
                scraped_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Schema(e.to_string()))?;

        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_latitude ON businesses(latitude)",
            "CREATE INDEX IF NOT EXISTS idx_longitude ON businesses(longitude)",
            "CREATE INDEX IF NOT EXISTS idx_category ON businesses(category)",
            "CREATE INDEX IF NOT EXISTS idx_place_id ON businesses(place_id)",
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Schema(e.to_string()))?;
        }

        Ok(())
    }
}
