//! In-memory ticket store backends for tests.
//!
//! - [`InMemoryTicketStore`]: `HashMap`-based store with a mutex per record
//! - [`FailingTicketStore`]: every operation fails, for error-path tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use ticketbooth_core::environment::Clock;
use ticketbooth_core::ticket_store::{StoreFuture, TicketStore, TicketStoreError};
use ticketbooth_core::types::{
    EventId, NewTicket, Pagination, TicketId, TicketRecord, TicketType, TicketUpdate,
};

type RecordMap = HashMap<TicketId, Arc<Mutex<TicketRecord>>>;

fn poisoned<T>(_: T) -> TicketStoreError {
    TicketStoreError::DatabaseError("in-memory store lock poisoned".to_string())
}

/// In-memory ticket store.
///
/// Each record sits behind its own `Mutex`, so purchases on the same ticket
/// are serialized while purchases on different tickets proceed in parallel.
/// The outer `RwLock` only guards membership of the map.
///
/// Every trait call is counted; [`operation_count`](Self::operation_count)
/// lets tests assert that validation failed before the store was touched.
///
/// # Example
///
/// ```
/// use ticketbooth_testing::InMemoryTicketStore;
/// use ticketbooth_core::ticket_store::TicketStore;
/// use ticketbooth_core::types::{Money, NewTicket, TicketType};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryTicketStore::new();
/// let ticket = store
///     .create(NewTicket {
///         event_id: None,
///         ticket_type: TicketType::General,
///         unit_price: Money::from_cents(1500),
///         quantity_available: 3,
///     })
///     .await?;
///
/// assert!(store.purchase(ticket.id, 2).await?);
/// assert!(!store.purchase(ticket.id, 2).await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryTicketStore {
    records: Arc<RwLock<RecordMap>>,
    clock: Arc<dyn Clock>,
    operations: Arc<AtomicUsize>,
}

impl InMemoryTicketStore {
    /// Create an empty store using the fixed test clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(crate::test_clock()))
    }

    /// Create an empty store with the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            clock,
            operations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Insert a record as-is, bypassing validation and uniqueness checks.
    ///
    /// Useful for seeding states such as a partially sold ticket.
    pub fn insert(&self, record: TicketRecord) {
        if let Ok(mut records) = self.records.write() {
            records.insert(record.id, Arc::new(Mutex::new(record)));
        }
    }

    /// Current copy of a record, without counting as an operation.
    #[must_use]
    pub fn snapshot(&self, id: TicketId) -> Option<TicketRecord> {
        let records = self.records.read().ok()?;
        let cell = records.get(&id)?;
        cell.lock().ok().map(|record| record.clone())
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map_or(0, |records| records.len())
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of [`TicketStore`] calls made so far.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }

    fn cell(&self, id: TicketId) -> Result<Option<Arc<Mutex<TicketRecord>>>, TicketStoreError> {
        Ok(self.records.read().map_err(poisoned)?.get(&id).cloned())
    }

    fn find_in(
        records: &RecordMap,
        event_id: Option<EventId>,
        ticket_type: TicketType,
        except: Option<TicketId>,
    ) -> Result<Option<TicketRecord>, TicketStoreError> {
        for (id, cell) in records {
            if Some(*id) == except {
                continue;
            }
            let record = cell.lock().map_err(poisoned)?;
            if record.event_id == event_id && record.ticket_type == ticket_type {
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }
}

impl Default for InMemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTicketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTicketStore")
            .field("records", &self.len())
            .field("operations", &self.operation_count())
            .finish_non_exhaustive()
    }
}

impl TicketStore for InMemoryTicketStore {
    fn get(&self, id: TicketId) -> StoreFuture<'_, Option<TicketRecord>> {
        self.count();
        Box::pin(async move {
            match self.cell(id)? {
                Some(cell) => Ok(Some(cell.lock().map_err(poisoned)?.clone())),
                None => Ok(None),
            }
        })
    }

    fn find_by_event_and_type(
        &self,
        event_id: EventId,
        ticket_type: TicketType,
    ) -> StoreFuture<'_, Option<TicketRecord>> {
        self.count();
        Box::pin(async move {
            let records = self.records.read().map_err(poisoned)?;
            Self::find_in(&records, Some(event_id), ticket_type, None)
        })
    }

    fn purchase(&self, id: TicketId, quantity: u32) -> StoreFuture<'_, bool> {
        self.count();
        Box::pin(async move {
            let Some(cell) = self.cell(id)? else {
                return Ok(false);
            };

            let mut record = cell.lock().map_err(poisoned)?;
            if record.quantity_available < quantity {
                return Ok(false);
            }
            let Some(sold) = record.quantity_sold.checked_add(quantity) else {
                return Err(TicketStoreError::DatabaseError(format!(
                    "quantity_sold overflow on ticket {id}"
                )));
            };

            record.quantity_available -= quantity;
            record.quantity_sold = sold;
            record.updated_at = self.clock.now();
            Ok(true)
        })
    }

    fn create(&self, ticket: NewTicket) -> StoreFuture<'_, TicketRecord> {
        self.count();
        Box::pin(async move {
            let mut records = self.records.write().map_err(poisoned)?;
            if Self::find_in(&records, ticket.event_id, ticket.ticket_type, None)?.is_some() {
                return Err(TicketStoreError::DuplicateTicket {
                    event_id: ticket.event_id,
                    ticket_type: ticket.ticket_type,
                });
            }

            let now = self.clock.now();
            let record = TicketRecord {
                id: TicketId::new(),
                event_id: ticket.event_id,
                ticket_type: ticket.ticket_type,
                unit_price: ticket.unit_price,
                quantity_available: ticket.quantity_available,
                quantity_sold: 0,
                created_at: now,
                updated_at: now,
            };
            records.insert(record.id, Arc::new(Mutex::new(record.clone())));
            Ok(record)
        })
    }

    fn list(&self, pagination: Pagination) -> StoreFuture<'_, Vec<TicketRecord>> {
        self.count();
        Box::pin(async move {
            let records = self.records.read().map_err(poisoned)?;
            let mut all = records
                .values()
                .map(|cell| cell.lock().map(|r| r.clone()).map_err(poisoned))
                .collect::<Result<Vec<_>, _>>()?;
            all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

            let skip = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
            let take = usize::try_from(pagination.page_size).unwrap_or(usize::MAX);
            Ok(all.into_iter().skip(skip).take(take).collect())
        })
    }

    fn update(&self, id: TicketId, update: TicketUpdate) -> StoreFuture<'_, Option<TicketRecord>> {
        self.count();
        Box::pin(async move {
            // Write lock so a type change cannot race another create/update
            // into a duplicate pair.
            let records = self.records.write().map_err(poisoned)?;
            let Some(cell) = records.get(&id) else {
                return Ok(None);
            };

            let event_id = cell.lock().map_err(poisoned)?.event_id;
            if let Some(ticket_type) = update.ticket_type {
                if Self::find_in(&records, event_id, ticket_type, Some(id))?.is_some() {
                    return Err(TicketStoreError::DuplicateTicket { event_id, ticket_type });
                }
            }

            let mut record = cell.lock().map_err(poisoned)?;
            if let Some(ticket_type) = update.ticket_type {
                record.ticket_type = ticket_type;
            }
            if let Some(unit_price) = update.unit_price {
                record.unit_price = unit_price;
            }
            if let Some(quantity_available) = update.quantity_available {
                record.quantity_available = quantity_available;
            }
            record.updated_at = self.clock.now();
            Ok(Some(record.clone()))
        })
    }

    fn delete(&self, id: TicketId) -> StoreFuture<'_, bool> {
        self.count();
        Box::pin(async move { Ok(self.records.write().map_err(poisoned)?.remove(&id).is_some()) })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        self.count();
        Box::pin(async { Ok(()) })
    }
}

/// Store whose every operation fails with a database error.
#[derive(Debug, Clone)]
pub struct FailingTicketStore {
    message: String,
}

impl FailingTicketStore {
    /// Create a store that fails with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail<T: Send + 'static>(&self) -> StoreFuture<'_, T> {
        let message = self.message.clone();
        Box::pin(async move { Err(TicketStoreError::DatabaseError(message)) })
    }
}

impl Default for FailingTicketStore {
    fn default() -> Self {
        Self::new("connection refused")
    }
}

impl TicketStore for FailingTicketStore {
    fn get(&self, _id: TicketId) -> StoreFuture<'_, Option<TicketRecord>> {
        self.fail()
    }

    fn find_by_event_and_type(
        &self,
        _event_id: EventId,
        _ticket_type: TicketType,
    ) -> StoreFuture<'_, Option<TicketRecord>> {
        self.fail()
    }

    fn purchase(&self, _id: TicketId, _quantity: u32) -> StoreFuture<'_, bool> {
        self.fail()
    }

    fn create(&self, _ticket: NewTicket) -> StoreFuture<'_, TicketRecord> {
        self.fail()
    }

    fn list(&self, _pagination: Pagination) -> StoreFuture<'_, Vec<TicketRecord>> {
        self.fail()
    }

    fn update(&self, _id: TicketId, _update: TicketUpdate) -> StoreFuture<'_, Option<TicketRecord>> {
        self.fail()
    }

    fn delete(&self, _id: TicketId) -> StoreFuture<'_, bool> {
        self.fail()
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        self.fail()
    }
}
