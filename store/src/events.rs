//! Event rows: upsert, lookup and listing.

use crate::error::Result;
use crate::models::{Event, EventFilter, EventPage, EventRecord, PageRequest};
use crate::store::{SqliteStore, now_millis};
use sqlx::{QueryBuilder, Sqlite};

impl SqliteStore {
    /// Insert or update an event, returning the stored row.
    ///
    /// On conflict the mutable fields are overwritten. `total_seats`,
    /// `organizer` and `created_at` keep their first-seen values.
    /// `synced_at` is always set to now. Case-folded copies of name and
    /// venue are kept alongside for search.
    ///
    /// # Errors
    ///
    /// Returns a database error if the write fails.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn upsert_event(&self, event: &EventRecord) -> Result<Event> {
        let row: Event = sqlx::query_as(
            r"
            INSERT INTO events (
                id, name, description, venue, name_folded, venue_folded, date,
                organizer, total_seats, available_seats, price_per_seat,
                image_url, is_active, created_at, updated_at, synced_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                venue = excluded.venue,
                name_folded = excluded.name_folded,
                venue_folded = excluded.venue_folded,
                date = excluded.date,
                available_seats = excluded.available_seats,
                price_per_seat = excluded.price_per_seat,
                image_url = excluded.image_url,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at,
                synced_at = excluded.synced_at
            RETURNING *
            ",
        )
        .bind(&event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.venue)
        .bind(fold_case(&event.name))
        .bind(fold_case(&event.venue))
        .bind(event.date)
        .bind(&event.organizer)
        .bind(event.total_seats)
        .bind(event.available_seats)
        .bind(event.price_per_seat)
        .bind(&event.image_url)
        .bind(event.is_active)
        .bind(event.created_at)
        .bind(event.updated_at)
        .bind(now_millis())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Event upserted");
        metrics::counter!("suistage.store.event_upserts").increment(1);

        Ok(row)
    }

    /// Fetch one event by ID.
    ///
    /// # Errors
    ///
    /// Returns a database error if the read fails.
    pub async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let row = sqlx::query_as("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// One page of events matching `filter`, latest `date` first.
    ///
    /// # Errors
    ///
    /// Returns a database error if either query fails.
    #[tracing::instrument(skip(self))]
    pub async fn list_events(&self, filter: &EventFilter, page: PageRequest) -> Result<EventPage> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM events");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM events");
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY date DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset());
        let events: Vec<Event> = select.build_query_as::<Event>().fetch_all(&self.pool).await?;

        Ok(EventPage {
            events,
            page: page.page,
            limit: page.limit,
            total,
        })
    }

    /// All events of one organizer, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the read fails.
    pub async fn events_by_organizer(&self, organizer: &str) -> Result<Vec<Event>> {
        let rows = sqlx::query_as("SELECT * FROM events WHERE organizer = ? ORDER BY created_at DESC")
            .bind(organizer)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Active events starting after `now_ms`, soonest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the read fails.
    pub async fn upcoming_events(&self, limit: u32, now_ms: i64) -> Result<Vec<Event>> {
        let rows = sqlx::query_as(
            r"
            SELECT * FROM events
            WHERE is_active = 1 AND date > ?
            ORDER BY date ASC
            LIMIT ?
            ",
        )
        .bind(now_ms)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &EventFilter) {
    let mut keyword = " WHERE ";

    if let Some(search) = &filter.search {
        // SQLite folds ASCII only, so both sides are folded here instead
        let pattern = like_pattern(&fold_case(search));
        builder
            .push(keyword)
            .push("(name_folded LIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR venue_folded LIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
        keyword = " AND ";
    }

    if let Some(organizer) = &filter.organizer {
        builder.push(keyword).push("organizer = ").push_bind(organizer.clone());
        keyword = " AND ";
    }

    if let Some(is_active) = filter.is_active {
        builder.push(keyword).push("is_active = ").push_bind(is_active);
        keyword = " AND ";
    }

    if let Some(after) = filter.upcoming_after {
        builder.push(keyword).push("date > ").push_bind(after);
    }
}

/// Unicode lowercase, used for case-insensitive search.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// `%term%` with LIKE metacharacters escaped by `\`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
