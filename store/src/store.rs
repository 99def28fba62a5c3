//! Connection management.

use crate::error::Result;
use crate::schema;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Where and how to open the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database file, created if missing
    pub path: PathBuf,
    /// Pool size
    pub max_connections: u32,
    /// How long a writer waits on a locked database
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Defaults for a database at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// SQLite-backed read cache.
///
/// Cheap to clone; clones share the pool. Tables are created on open.
///
/// # Example
///
/// ```no_run
/// use suistage_store::{SqliteStore, StoreConfig};
///
/// # async fn example() -> Result<(), suistage_store::StoreError> {
/// let store = SqliteStore::open(&StoreConfig::new("data/events.db")).await?;
/// let stats = store.database_stats().await?;
/// println!("{} events cached", stats.events);
/// store.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) pool: SqlitePool,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) the database file and apply the schema.
    ///
    /// Connections use WAL journaling, `synchronous = NORMAL`, in-memory
    /// temp tables and foreign-key enforcement.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created, the
    /// database cannot be opened, or the schema fails to apply.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout)
            .foreign_keys(true)
            .pragma("temp_store", "MEMORY")
            .pragma("cache_size", "-10000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        schema::apply(&pool).await?;

        tracing::info!(path = %config.path.display(), "SQLite database initialized");

        Ok(Self {
            pool,
            path: Some(config.path.clone()),
        })
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since each
    /// SQLite in-memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema fails to apply.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        schema::apply(&pool).await?;

        Ok(Self { pool, path: None })
    }

    /// Database file, `None` when in memory.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection. Later operations fail.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection closed");
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
