//! Idempotent schema.
//!
//! Every statement uses `IF NOT EXISTS`, so applying the schema to an
//! existing database is a no-op.

use crate::error::Result;
use sqlx::SqlitePool;

/// Millisecond timestamp default for `created_at`/`synced_at` columns.
macro_rules! now_ms_default {
    () => {
        "(CAST(strftime('%s', 'now') AS INTEGER) * 1000)"
    };
}

const STATEMENTS: &[&str] = &[
    concat!(
        r"
    CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        venue TEXT NOT NULL,
        name_folded TEXT NOT NULL DEFAULT '',
        venue_folded TEXT NOT NULL DEFAULT '',
        date INTEGER NOT NULL,
        organizer TEXT NOT NULL,
        total_seats INTEGER NOT NULL,
        available_seats INTEGER NOT NULL,
        price_per_seat INTEGER NOT NULL,
        image_url TEXT NOT NULL DEFAULT '',
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        synced_at INTEGER NOT NULL DEFAULT ",
        now_ms_default!(),
        r"
    )"
    ),
    "CREATE INDEX IF NOT EXISTS idx_events_date ON events(date) WHERE is_active = 1",
    "CREATE INDEX IF NOT EXISTS idx_events_organizer ON events(organizer)",
    "CREATE INDEX IF NOT EXISTS idx_events_active ON events(is_active)",
    "CREATE INDEX IF NOT EXISTS idx_events_name ON events(name) WHERE is_active = 1",
    concat!(
        r"
    CREATE TABLE IF NOT EXISTS event_transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_id TEXT REFERENCES events(id),
        tx_digest TEXT NOT NULL,
        event_type TEXT NOT NULL,
        sender TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        data TEXT NOT NULL DEFAULT 'null',
        created_at INTEGER NOT NULL DEFAULT ",
        now_ms_default!(),
        r",
        UNIQUE (tx_digest, event_type)
    )"
    ),
    "CREATE INDEX IF NOT EXISTS idx_tx_event_id ON event_transactions(event_id)",
    "CREATE INDEX IF NOT EXISTS idx_tx_type ON event_transactions(event_type)",
    concat!(
        r"
    CREATE TABLE IF NOT EXISTS seat_reservations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_id TEXT NOT NULL REFERENCES events(id),
        buyer TEXT NOT NULL,
        seat_count INTEGER NOT NULL,
        total_price INTEGER NOT NULL,
        tx_digest TEXT NOT NULL,
        reserved_at INTEGER NOT NULL,
        created_at INTEGER NOT NULL DEFAULT ",
        now_ms_default!(),
        r"
    )"
    ),
    "CREATE INDEX IF NOT EXISTS idx_res_event_id ON seat_reservations(event_id)",
    "CREATE INDEX IF NOT EXISTS idx_res_buyer ON seat_reservations(buyer)",
];

/// Create tables and indexes that do not exist yet.
///
/// # Errors
///
/// Returns [`StoreError::Database`](crate::StoreError::Database) if any
/// statement fails.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::debug!(statements = STATEMENTS.len(), "Schema applied");
    Ok(())
}
