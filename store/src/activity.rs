//! Transaction observations, seat reservations and their aggregates.

use crate::error::Result;
use crate::models::{
    EventTransaction, NewEventTransaction, NewSeatReservation, ReservationStats, SeatReservation,
};
use crate::store::SqliteStore;
use sqlx::SqliteExecutor;

impl SqliteStore {
    /// Record a contract event observed in a transaction.
    ///
    /// The `(tx_digest, event_type)` pair is unique. Recording the same pair
    /// again is a no-op and returns `None`, which makes replaying a chain
    /// query safe.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`](crate::StoreError::ForeignKeyViolation)
    /// if `event_id` names an event that is not stored.
    #[tracing::instrument(skip(self, tx), fields(tx_digest = %tx.tx_digest, event_type = %tx.event_type))]
    pub async fn record_transaction(
        &self,
        tx: &NewEventTransaction,
    ) -> Result<Option<EventTransaction>> {
        let row = insert_transaction(&self.pool, tx).await?;

        if row.is_none() {
            tracing::debug!("Transaction already recorded");
        }

        Ok(row)
    }

    /// Transactions recorded for an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the read fails.
    pub async fn transactions_for_event(&self, event_id: &str) -> Result<Vec<EventTransaction>> {
        let rows = sqlx::query_as(
            "SELECT * FROM event_transactions WHERE event_id = ? ORDER BY timestamp DESC, id DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Append a seat reservation.
    ///
    /// Reservations are not deduplicated here; chain ingest goes through
    /// [`Self::record_reservation_once`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`](crate::StoreError::ForeignKeyViolation)
    /// if the event is not stored.
    #[tracing::instrument(skip(self, reservation), fields(event_id = %reservation.event_id))]
    pub async fn record_reservation(
        &self,
        reservation: &NewSeatReservation,
    ) -> Result<SeatReservation> {
        let row = insert_reservation(&self.pool, reservation).await?;
        reservation_recorded(&row);
        Ok(row)
    }

    /// Record the transaction that emitted a reservation and the reservation
    /// itself, atomically.
    ///
    /// Returns `None` without writing anything when the `(tx_digest,
    /// event_type)` pair was already recorded. If either insert fails,
    /// neither row is kept, so a later replay ingests the reservation again.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKeyViolation`](crate::StoreError::ForeignKeyViolation)
    /// if the event is not stored, or a database error if either insert or
    /// the commit fails.
    #[tracing::instrument(skip(self, tx, reservation), fields(tx_digest = %tx.tx_digest, event_id = %reservation.event_id))]
    pub async fn record_reservation_once(
        &self,
        tx: &NewEventTransaction,
        reservation: &NewSeatReservation,
    ) -> Result<Option<SeatReservation>> {
        let mut db_tx = self.pool.begin().await?;

        if insert_transaction(&mut *db_tx, tx).await?.is_none() {
            // Nothing was written
            let _ = db_tx.rollback().await;
            tracing::debug!("Reservation transaction already recorded");
            return Ok(None);
        }

        let row = insert_reservation(&mut *db_tx, reservation).await?;
        db_tx.commit().await?;

        reservation_recorded(&row);
        Ok(Some(row))
    }

    /// Tickets sold, revenue and distinct buyers for an event.
    ///
    /// An event without reservations yields all zeros.
    ///
    /// # Errors
    ///
    /// Returns a database error if any aggregate query fails.
    pub async fn event_stats(&self, event_id: &str) -> Result<ReservationStats> {
        let tickets = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(seat_count), 0) FROM seat_reservations WHERE event_id = ?",
        )
        .bind(event_id)
        .fetch_one(&self.pool);

        let revenue = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(total_price), 0) FROM seat_reservations WHERE event_id = ?",
        )
        .bind(event_id)
        .fetch_one(&self.pool);

        let buyers = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT buyer) FROM seat_reservations WHERE event_id = ?",
        )
        .bind(event_id)
        .fetch_one(&self.pool);

        let (tickets_sold, total_revenue, unique_buyers) =
            tokio::try_join!(tickets, revenue, buyers)?;

        Ok(ReservationStats {
            tickets_sold,
            total_revenue,
            unique_buyers,
        })
    }
}

async fn insert_transaction<'e, E>(
    executor: E,
    tx: &NewEventTransaction,
) -> Result<Option<EventTransaction>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as(
        r"
        INSERT INTO event_transactions (
            event_id, tx_digest, event_type, sender, timestamp, data
        ) VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (tx_digest, event_type) DO NOTHING
        RETURNING *
        ",
    )
    .bind(tx.event_id.as_deref())
    .bind(&tx.tx_digest)
    .bind(&tx.event_type)
    .bind(&tx.sender)
    .bind(tx.timestamp)
    .bind(tx.data.to_string())
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

async fn insert_reservation<'e, E>(
    executor: E,
    reservation: &NewSeatReservation,
) -> Result<SeatReservation>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as(
        r"
        INSERT INTO seat_reservations (
            event_id, buyer, seat_count, total_price, tx_digest, reserved_at
        ) VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(&reservation.event_id)
    .bind(&reservation.buyer)
    .bind(reservation.seat_count)
    .bind(reservation.total_price)
    .bind(&reservation.tx_digest)
    .bind(reservation.reserved_at)
    .fetch_one(executor)
    .await?;
    Ok(row)
}

fn reservation_recorded(row: &SeatReservation) {
    tracing::info!(
        buyer = %row.buyer,
        seat_count = row.seat_count,
        "Seat reservation recorded"
    );
    metrics::counter!("suistage.store.reservations").increment(1);
}
