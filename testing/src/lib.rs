//! # Ticketbooth Testing
//!
//! Testing utilities and helpers for Ticketbooth.
//!
//! This crate provides:
//! - In-memory and always-failing [`TicketStore`](ticketbooth_core::TicketStore) backends
//! - A fixed clock for deterministic timestamps
//! - Fixture builders for ticket records
//! - proptest strategies for purchase sequences
//!
//! ## Example
//!
//! ```ignore
//! use ticketbooth_testing::{helpers, InMemoryTicketStore};
//! use ticketbooth_core::TicketInventory;
//!
//! #[tokio::test]
//! async fn test_purchase() {
//!     let store = Arc::new(InMemoryTicketStore::new());
//!     let ticket = helpers::seed_ticket(&store, 3, 0);
//!     let inventory = TicketInventory::new(store.clone());
//!     // ...
//! }
//! ```

use chrono::{DateTime, Utc};
use ticketbooth_core::environment::Clock;

mod ticket_store_mocks;

pub use ticket_store_mocks::{FailingTicketStore, InMemoryTicketStore};

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use ticketbooth_testing::mocks::FixedClock;
    /// use ticketbooth_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

/// Fixture builders.
pub mod helpers {
    use super::{Clock, InMemoryTicketStore};
    use ticketbooth_core::types::{EventId, Money, TicketId, TicketRecord, TicketType};

    /// Build a record with the given counters, timestamps from the test clock.
    #[must_use]
    pub fn ticket_record(
        event_id: Option<EventId>,
        ticket_type: TicketType,
        quantity_available: u32,
        quantity_sold: u32,
    ) -> TicketRecord {
        let now = super::test_clock().now();
        TicketRecord {
            id: TicketId::new(),
            event_id,
            ticket_type,
            unit_price: Money::from_cents(5_000),
            quantity_available,
            quantity_sold,
            created_at: now,
            updated_at: now,
        }
    }

    /// Insert a general-admission record for a fresh event and return it.
    pub fn seed_ticket(
        store: &InMemoryTicketStore,
        quantity_available: u32,
        quantity_sold: u32,
    ) -> TicketRecord {
        let record = ticket_record(
            Some(EventId::new()),
            TicketType::General,
            quantity_available,
            quantity_sold,
        );
        store.insert(record.clone());
        record
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::collection::vec;
    use proptest::prelude::*;

    /// Initial stock for a ticket record.
    pub fn initial_stock() -> impl Strategy<Value = u32> {
        0u32..200
    }

    /// A sequence of requested purchase quantities, including zero and
    /// quantities larger than any initial stock.
    pub fn purchase_quantities() -> impl Strategy<Value = Vec<u32>> {
        vec(prop_oneof![4 => 1u32..10, 1 => Just(0u32), 1 => 150u32..300], 0..40)
    }
}

/// Install a compact `tracing` subscriber for test output.
///
/// Safe to call from many tests; only the first call takes effect.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,ticketbooth=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn seeded_ticket_is_visible() {
        let store = InMemoryTicketStore::new();
        let record = helpers::seed_ticket(&store, 3, 1);
        assert_eq!(store.snapshot(record.id), Some(record));
        assert_eq!(store.operation_count(), 0);
    }
}
