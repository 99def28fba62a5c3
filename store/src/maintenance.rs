//! Housekeeping: statistics, backups and optimization.

use crate::error::Result;
use crate::models::DatabaseStats;
use crate::store::SqliteStore;
use std::path::{Path, PathBuf};

impl SqliteStore {
    /// Row counts per table plus the database size.
    ///
    /// # Errors
    ///
    /// Returns a database error if any count fails.
    pub async fn database_stats(&self) -> Result<DatabaseStats> {
        let events = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events").fetch_one(&self.pool);
        let transactions =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event_transactions").fetch_one(&self.pool);
        let reservations =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM seat_reservations").fetch_one(&self.pool);
        let size_bytes = sqlx::query_scalar::<_, i64>(
            "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
        )
        .fetch_one(&self.pool);

        let (events, transactions, reservations, size_bytes) =
            tokio::try_join!(events, transactions, reservations, size_bytes)?;

        Ok(DatabaseStats {
            events,
            transactions,
            reservations,
            size_bytes,
        })
    }

    /// Write a consistent copy of the database to `destination`.
    ///
    /// Parent directories are created as needed. The destination must not
    /// already exist.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created, or a
    /// database error if `VACUUM INTO` fails.
    pub async fn backup(&self, destination: impl AsRef<Path>) -> Result<PathBuf> {
        let destination = destination.as_ref();
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        sqlx::query("VACUUM INTO ?")
            .bind(destination.to_string_lossy().into_owned())
            .execute(&self.pool)
            .await?;

        tracing::info!(path = %destination.display(), "Database backed up");
        Ok(destination.to_path_buf())
    }

    /// Refresh planner statistics, compact the file and rebuild indexes.
    ///
    /// # Errors
    ///
    /// Returns a database error if any step fails.
    pub async fn optimize(&self) -> Result<()> {
        tracing::info!("Optimizing database");

        for statement in ["ANALYZE", "VACUUM", "REINDEX"] {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        tracing::info!("Database optimized");
        Ok(())
    }
}

/// `<dir>/suistage_<UTC timestamp>.db`
#[must_use]
pub fn default_backup_path(dir: impl AsRef<Path>) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3fZ");
    dir.as_ref().join(format!("suistage_{stamp}.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backup_path() {
        let path = default_backup_path("backups");
        assert!(path.starts_with("backups"));

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.starts_with("suistage_"));
        assert!(name.ends_with(".db"));
    }
}
