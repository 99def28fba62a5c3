//! Store error type.

use thiserror::Error;

/// Errors returned by [`SqliteStore`](crate::SqliteStore) operations.
///
/// Constraint violations are split out so callers can map them to
/// distinct responses without inspecting driver-specific codes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A `UNIQUE` or `PRIMARY KEY` constraint was violated
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A `FOREIGN KEY` constraint was violated
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(String),

    /// Filesystem failure (backup directory, database file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this is a uniqueness violation.
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Whether this is a foreign key violation.
    #[must_use]
    pub const fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::UniqueViolation(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return Self::ForeignKeyViolation(db_err.message().to_string());
            }
        }
        Self::Database(err.to_string())
    }
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
