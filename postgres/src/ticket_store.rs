//! `PostgreSQL` implementation of [`TicketStore`].
//!
//! A purchase is a single conditional `UPDATE`: the row is changed only if
//! enough units remain, and the row lock taken by the update serializes
//! concurrent buyers of the same ticket across every process sharing the
//! database.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use ticketbooth_core::ticket_store::{StoreFuture, TicketStore, TicketStoreError};
use ticketbooth_core::types::{
    EventId, Money, NewTicket, Pagination, TicketId, TicketRecord, TicketType, TicketUpdate,
};
use uuid::Uuid;

const COLUMNS: &str = "id, event_id, ticket_type, price_cents, quantity_available, \
                       quantity_sold, created_at, updated_at";

/// `PostgreSQL`-backed ticket store.
///
/// # Example
///
/// ```no_run
/// use ticketbooth_postgres::PostgresTicketStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = PostgresTicketStore::connect("postgres://localhost/tickets").await?;
/// store.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PostgresTicketStore {
    pool: PgPool,
}

impl PostgresTicketStore {
    /// Connect to the database at `database_url` with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`TicketStoreError::DatabaseError`] if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, TicketStoreError> {
        let pool = PgPool::connect(database_url).await.map_err(db_error)?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`TicketStoreError::DatabaseError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), TicketStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TicketStoreError::DatabaseError(format!("Migration failed: {e}")))?;
        tracing::info!("Ticket store migrations complete");
        Ok(())
    }

    async fn fetch_by_id(&self, id: TicketId) -> Result<Option<TicketRecord>, TicketStoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM tickets WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn fetch_by_event_and_type(
        &self,
        event_id: EventId,
        ticket_type: TicketType,
    ) -> Result<Option<TicketRecord>, TicketStoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM tickets WHERE event_id = $1 AND ticket_type = $2"
        ))
        .bind(event_id.as_uuid())
        .bind(ticket_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn conditional_purchase(
        &self,
        id: TicketId,
        quantity: u32,
    ) -> Result<bool, TicketStoreError> {
        // No row can hold more than i32::MAX units.
        let Ok(quantity) = i32::try_from(quantity) else {
            return Ok(false);
        };

        let result = sqlx::query(
            r"
            UPDATE tickets
            SET quantity_available = quantity_available - $2,
                quantity_sold = quantity_sold + $2,
                updated_at = NOW()
            WHERE id = $1 AND quantity_available >= $2
            ",
        )
        .bind(id.as_uuid())
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let applied = result.rows_affected() == 1;
        if !applied {
            metrics::counter!("ticket_store.purchase.unmatched").increment(1);
        }
        tracing::debug!(ticket_id = %id, quantity, applied, "Conditional purchase executed");
        Ok(applied)
    }

    async fn insert(&self, ticket: NewTicket) -> Result<TicketRecord, TicketStoreError> {
        let row = sqlx::query(&format!(
            r"
            INSERT INTO tickets (id, event_id, ticket_type, price_cents, quantity_available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(ticket.event_id.map(|e| *e.as_uuid()))
        .bind(ticket.ticket_type.as_str())
        .bind(price_to_column(ticket.unit_price)?)
        .bind(stock_to_column(ticket.quantity_available)?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_or_db_error(e, ticket.event_id, ticket.ticket_type))?;

        row_to_record(&row)
    }

    async fn page(&self, pagination: Pagination) -> Result<Vec<TicketRecord>, TicketStoreError> {
        let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM tickets ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(pagination.page_size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_record).collect()
    }

    async fn apply_update(
        &self,
        id: TicketId,
        update: TicketUpdate,
    ) -> Result<Option<TicketRecord>, TicketStoreError> {
        let result = sqlx::query(&format!(
            r"
            UPDATE tickets
            SET ticket_type = COALESCE($2, ticket_type),
                price_cents = COALESCE($3, price_cents),
                quantity_available = COALESCE($4, quantity_available),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id.as_uuid())
        .bind(update.ticket_type.map(|t| t.as_str()))
        .bind(update.unit_price.map(price_to_column).transpose()?)
        .bind(update.quantity_available.map(stock_to_column).transpose()?)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(row) => row.as_ref().map(row_to_record).transpose(),
            Err(e) => match update.ticket_type {
                // Only a type change can collide with another record.
                Some(ticket_type) if is_unique_violation(&e) => {
                    let event_id = self.fetch_by_id(id).await?.and_then(|r| r.event_id);
                    Err(TicketStoreError::DuplicateTicket {
                        event_id,
                        ticket_type,
                    })
                }
                _ => Err(db_error(e)),
            },
        }
    }

    async fn remove(&self, id: TicketId) -> Result<bool, TicketStoreError> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn select_one(&self) -> Result<(), TicketStoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

impl TicketStore for PostgresTicketStore {
    fn get(&self, id: TicketId) -> StoreFuture<'_, Option<TicketRecord>> {
        Box::pin(self.fetch_by_id(id))
    }

    fn find_by_event_and_type(
        &self,
        event_id: EventId,
        ticket_type: TicketType,
    ) -> StoreFuture<'_, Option<TicketRecord>> {
        Box::pin(self.fetch_by_event_and_type(event_id, ticket_type))
    }

    fn purchase(&self, id: TicketId, quantity: u32) -> StoreFuture<'_, bool> {
        Box::pin(self.conditional_purchase(id, quantity))
    }

    fn create(&self, ticket: NewTicket) -> StoreFuture<'_, TicketRecord> {
        Box::pin(self.insert(ticket))
    }

    fn list(&self, pagination: Pagination) -> StoreFuture<'_, Vec<TicketRecord>> {
        Box::pin(self.page(pagination))
    }

    fn update(&self, id: TicketId, update: TicketUpdate) -> StoreFuture<'_, Option<TicketRecord>> {
        Box::pin(self.apply_update(id, update))
    }

    fn delete(&self, id: TicketId) -> StoreFuture<'_, bool> {
        Box::pin(self.remove(id))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(self.select_one())
    }
}

fn db_error(e: sqlx::Error) -> TicketStoreError {
    TicketStoreError::DatabaseError(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn duplicate_or_db_error(
    e: sqlx::Error,
    event_id: Option<EventId>,
    ticket_type: TicketType,
) -> TicketStoreError {
    if is_unique_violation(&e) {
        TicketStoreError::DuplicateTicket {
            event_id,
            ticket_type,
        }
    } else {
        db_error(e)
    }
}

fn price_to_column(price: Money) -> Result<i64, TicketStoreError> {
    i64::try_from(price.cents()).map_err(|_| {
        TicketStoreError::DatabaseError(format!("price {price} exceeds column range"))
    })
}

fn stock_to_column(quantity: u32) -> Result<i32, TicketStoreError> {
    i32::try_from(quantity).map_err(|_| {
        TicketStoreError::DatabaseError(format!("quantity {quantity} exceeds column range"))
    })
}

/// Convert a database row to a `TicketRecord`.
///
/// Negative counters, a negative price or an unknown ticket type make the
/// row [`TicketStoreError::Corrupt`].
fn row_to_record(row: &PgRow) -> Result<TicketRecord, TicketStoreError> {
    let id = TicketId::from_uuid(row.try_get("id").map_err(db_error)?);
    let corrupt = |reason: String| TicketStoreError::Corrupt { id, reason };

    let event_id: Option<Uuid> = row.try_get("event_id").map_err(db_error)?;
    let ticket_type: String = row.try_get("ticket_type").map_err(db_error)?;
    let price_cents: i64 = row.try_get("price_cents").map_err(db_error)?;
    let quantity_available: i32 = row.try_get("quantity_available").map_err(db_error)?;
    let quantity_sold: i32 = row.try_get("quantity_sold").map_err(db_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(db_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(db_error)?;

    Ok(TicketRecord {
        id,
        event_id: event_id.map(EventId::from_uuid),
        ticket_type: ticket_type.parse::<TicketType>().map_err(|e| corrupt(format!("{e}")))?,
        unit_price: u64::try_from(price_cents)
            .map(Money::from_cents)
            .map_err(|_| corrupt(format!("negative price_cents {price_cents}")))?,
        quantity_available: u32::try_from(quantity_available)
            .map_err(|_| corrupt(format!("negative quantity_available {quantity_available}")))?,
        quantity_sold: u32::try_from(quantity_sold)
            .map_err(|_| corrupt(format!("negative quantity_sold {quantity_sold}")))?,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn stock_outside_integer_column_is_rejected() {
        assert_eq!(stock_to_column(7).unwrap(), 7);
        assert!(stock_to_column(u32::MAX).is_err());
    }

    #[test]
    fn price_outside_bigint_column_is_rejected() {
        assert_eq!(price_to_column(Money::from_cents(1_999)).unwrap(), 1_999);
        assert!(price_to_column(Money::from_cents(u64::MAX)).is_err());
    }

    #[test]
    fn non_database_errors_are_not_duplicates() {
        let err = duplicate_or_db_error(sqlx::Error::RowNotFound, None, TicketType::Vip);
        assert!(matches!(err, TicketStoreError::DatabaseError(_)));
    }
}
