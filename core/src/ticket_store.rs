//! Ticket store trait and related types.
//!
//! This module defines the narrow storage contract the inventory core relies
//! on: read a ticket record, find it by (event, type), and attempt an atomic
//! conditional purchase. Administrative operations (create, list, update,
//! delete) live on the same trait so one backend serves the whole service.
//!
//! # Implementations
//!
//! - `PostgresTicketStore` (in `ticketbooth-postgres`): production, conditional `UPDATE`
//! - `InMemoryTicketStore` (in `ticketbooth-testing`): per-record mutex, for tests
//!
//! # Example
//!
//! ```no_run
//! use ticketbooth_core::ticket_store::{TicketStore, TicketStoreError};
//! use ticketbooth_core::types::TicketId;
//!
//! async fn buy_two<S: TicketStore>(store: &S, id: TicketId) -> Result<bool, TicketStoreError> {
//!     // Either both units move from available to sold, or nothing changes.
//!     store.purchase(id, 2).await
//! }
//! ```

use crate::types::{EventId, NewTicket, Pagination, TicketId, TicketRecord, TicketType, TicketUpdate};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`TicketStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TicketStoreError>> + Send + 'a>>;

/// Errors that can occur during ticket store operations.
#[derive(Error, Debug)]
pub enum TicketStoreError {
    /// A record for this (event, ticket type) pair already exists.
    #[error("Ticket already exists for event {event_id:?} and type {ticket_type}")]
    DuplicateTicket {
        /// Owning event of the conflicting record.
        event_id: Option<EventId>,
        /// Ticket type of the conflicting record.
        ticket_type: TicketType,
    },

    /// Stored values violate a domain constraint (negative count, unknown type).
    #[error("Corrupt ticket record {id}: {reason}")]
    Corrupt {
        /// Offending record.
        id: TicketId,
        /// What was wrong with it.
        reason: String,
    },

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Storage abstraction for ticket inventory.
///
/// # Atomicity
///
/// [`purchase`](TicketStore::purchase) is the only operation that must be
/// race-safe: the availability check and the counter update happen as one
/// step with respect to every other caller, including callers in other
/// processes sharing the same database. No method retries internally.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures instead of using `async fn` so the store can
/// be shared as `Arc<dyn TicketStore>` across HTTP handlers.
pub trait TicketStore: Send + Sync {
    /// Load a ticket record by id.
    ///
    /// Returns `Ok(None)` when no record exists.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the query failed
    /// - `Corrupt`: the stored row could not be mapped to a [`TicketRecord`]
    fn get(&self, id: TicketId) -> StoreFuture<'_, Option<TicketRecord>>;

    /// Find the single record for an (event, ticket type) pair.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the query failed
    /// - `Corrupt`: the stored row could not be mapped to a [`TicketRecord`]
    fn find_by_event_and_type(
        &self,
        event_id: EventId,
        ticket_type: TicketType,
    ) -> StoreFuture<'_, Option<TicketRecord>>;

    /// Atomically move `quantity` units from available to sold.
    ///
    /// Applies the update only if `quantity_available >= quantity` at the
    /// moment of the attempt. Returns `true` when the update was applied and
    /// `false` otherwise; on `false` no field of any record has changed.
    /// A missing record also yields `false`.
    ///
    /// Concurrent calls against the same id behave as if executed in some
    /// total order, each observing the effect of the ones before it.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the statement failed; the outcome is unknown to the
    ///   caller only if the failure happened after the statement was sent
    fn purchase(&self, id: TicketId, quantity: u32) -> StoreFuture<'_, bool>;

    /// Insert a new record with `quantity_sold = 0`.
    ///
    /// # Errors
    ///
    /// - `DuplicateTicket`: a record for the same (event, type) already exists
    /// - `DatabaseError`: the insert failed
    fn create(&self, ticket: NewTicket) -> StoreFuture<'_, TicketRecord>;

    /// List records ordered by creation time.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the query failed
    fn list(&self, pagination: Pagination) -> StoreFuture<'_, Vec<TicketRecord>>;

    /// Apply an administrative update. Returns `Ok(None)` when no record exists.
    ///
    /// # Errors
    ///
    /// - `DuplicateTicket`: changing the type would collide with another record
    /// - `DatabaseError`: the update failed
    fn update(&self, id: TicketId, update: TicketUpdate) -> StoreFuture<'_, Option<TicketRecord>>;

    /// Delete a record. Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the delete failed
    fn delete(&self, id: TicketId) -> StoreFuture<'_, bool>;

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the backend did not answer
    fn ping(&self) -> StoreFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ticket_error_display() {
        let error = TicketStoreError::DuplicateTicket {
            event_id: None,
            ticket_type: TicketType::Vip,
        };

        let display = format!("{error}");
        assert!(display.contains("VIP"));
        assert!(display.contains("None"));
    }

    #[test]
    fn corrupt_error_display() {
        let id = TicketId::new();
        let error = TicketStoreError::Corrupt {
            id,
            reason: "negative quantity_available".to_string(),
        };
        let display = format!("{error}");
        assert!(display.contains(&id.to_string()));
        assert!(display.contains("negative"));
    }
}
