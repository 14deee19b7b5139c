//! # Ticketbooth Core
//!
//! Domain types, storage contract and purchase orchestration for ticket
//! inventory.
//!
//! ## Core Concepts
//!
//! - **Ticket record**: inventory row for one (event, ticket type) pair
//! - **Ticket store**: storage backend exposing an atomic conditional purchase
//! - **Lookup**: resolves a request to a concrete ticket id
//! - **Inventory service**: validates, resolves and executes purchases
//!
//! ## Concurrency
//!
//! No locks live in this crate. The check "enough units left?" and the update
//! "move units from available to sold" happen inside
//! [`TicketStore::purchase`], which the backend makes atomic (a conditional
//! `UPDATE` in Postgres, a per-record mutex in memory). Concurrent purchases
//! against different tickets never wait on each other.
//!
//! ## Example
//!
//! ```ignore
//! use ticketbooth_core::{PurchaseRequest, TicketInventory};
//!
//! let inventory = TicketInventory::new(store);
//! let receipt = inventory
//!     .purchase_ticket(PurchaseRequest {
//!         event_id: Some(event_id),
//!         ticket_type: Some("vip".into()),
//!         quantity: Some(2),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

pub mod error;
pub mod inventory;
pub mod lookup;
pub mod ticket_store;
pub mod types;

pub use error::{InventoryError, Result};
pub use inventory::{
    Availability, CreateTicketRequest, PurchasePolicy, PurchaseReceipt, PurchaseRequest,
    PurchaseStatus, TicketInventory, UpdateTicketRequest,
};
pub use lookup::TicketSelector;
pub use ticket_store::{TicketStore, TicketStoreError};
pub use types::{
    EventId, Money, NewTicket, Pagination, TicketId, TicketRecord, TicketType, TicketUpdate,
};

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

/// Environment module - Dependency injection traits
///
/// External dependencies that tests need to control are abstracted behind
/// traits and injected into the components that use them.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }
}
