//! Purchase orchestration, availability queries and ticket administration.
//!
//! [`TicketInventory`] is the service the HTTP layer talks to. It validates
//! input, resolves which record a request targets, and delegates the one
//! race-sensitive step to [`TicketStore::purchase`]:
//!
//! ```text
//! purchase_ticket(request)
//!   1. validate quantity          → InvalidRequest (no store access)
//!   2. build selector             → InvalidRequest
//!   3. resolve (id | event+type)  → NotFound
//!   4. store.purchase(id, qty)    → true: receipt
//!                                 → false: NotFound | InsufficientStock
//! ```
//!
//! Nothing here retries. A `false` from the store means a competing purchase
//! or genuine lack of supply; a storage error after the statement was sent
//! leaves the outcome unknown, and replaying it could sell twice.

use crate::error::{InventoryError, Result};
use crate::lookup::{self, TicketSelector};
use crate::ticket_store::TicketStore;
use crate::types::{
    EventId, Money, NewTicket, Pagination, TicketId, TicketRecord, TicketType, TicketUpdate,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default cap on units per purchase.
pub const DEFAULT_MAX_QUANTITY_PER_PURCHASE: u32 = 100;

/// Largest `available + sold` a record may hold; both counters live in signed
/// 32-bit columns and purchases only move units between them.
pub const MAX_TOTAL_UNITS: u32 = i32::MAX.unsigned_abs();

// ============================================================================
// Request / result types
// ============================================================================

/// A purchase as submitted by a client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Explicit ticket id.
    pub ticket_id: Option<TicketId>,
    /// Owning event, used with `ticket_type` when no id is given.
    pub event_id: Option<EventId>,
    /// Free-form ticket type, used with `event_id` when no id is given.
    pub ticket_type: Option<String>,
    /// Units to buy. Required and positive.
    pub quantity: Option<i64>,
}

/// Outcome marker of a successful purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    /// Units were moved from available to sold.
    Purchased,
}

/// Result of a successful purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    /// Resolved ticket id.
    pub ticket_id: TicketId,
    /// Units bought.
    pub quantity: u32,
    /// Always [`PurchaseStatus::Purchased`].
    pub status: PurchaseStatus,
}

/// Point-in-time stock snapshot for an (event, type) pair.
///
/// Advisory only: a concurrent purchase may consume the stock right after
/// this was read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Whether at least one unit was left.
    pub available: bool,
    /// Units left.
    pub quantity_available: u32,
}

impl Availability {
    /// Snapshot used when no record matches.
    pub const NONE: Self = Self {
        available: false,
        quantity_available: 0,
    };

    fn of(record: &TicketRecord) -> Self {
        Self {
            available: record.is_available(),
            quantity_available: record.quantity_available,
        }
    }
}

/// Administrative create input, validated by [`TicketInventory::create_ticket`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    /// Owning event, if any.
    pub event_id: Option<EventId>,
    /// Ticket type; must name a known category.
    pub ticket_type: String,
    /// Price of one unit in cents; must be non-negative.
    pub unit_price_cents: i64,
    /// Initial stock; must be non-negative.
    pub quantity_available: i64,
}

/// Administrative update input, validated by [`TicketInventory::update_ticket`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    /// New ticket type.
    pub ticket_type: Option<String>,
    /// New unit price in cents.
    pub unit_price_cents: Option<i64>,
    /// New remaining stock.
    pub quantity_available: Option<i64>,
}

// ============================================================================
// Service
// ============================================================================

/// Limits applied to purchase requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurchasePolicy {
    /// Largest quantity accepted in one purchase.
    pub max_quantity_per_purchase: u32,
}

impl Default for PurchasePolicy {
    fn default() -> Self {
        Self {
            max_quantity_per_purchase: DEFAULT_MAX_QUANTITY_PER_PURCHASE,
        }
    }
}

/// Ticket inventory service.
///
/// Cheap to clone; all clones share one store.
#[derive(Clone)]
pub struct TicketInventory {
    store: Arc<dyn TicketStore>,
    policy: PurchasePolicy,
}

impl TicketInventory {
    /// Create a service over `store` with the default policy.
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self::with_policy(store, PurchasePolicy::default())
    }

    /// Create a service with an explicit purchase policy.
    #[must_use]
    pub fn with_policy(store: Arc<dyn TicketStore>, policy: PurchasePolicy) -> Self {
        Self { store, policy }
    }

    /// Buy `quantity` units of one ticket type.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::InvalidRequest`]: bad quantity or no usable selector
    /// - [`InventoryError::NotFound`]: the target record does not exist
    /// - [`InventoryError::InsufficientStock`]: fewer units left than requested
    /// - [`InventoryError::Storage`]: the store failed; outcome may be unknown
    #[tracing::instrument(
        skip(self, request),
        fields(
            ticket_id = ?request.ticket_id,
            event_id = ?request.event_id,
            quantity = ?request.quantity,
        )
    )]
    pub async fn purchase_ticket(&self, request: PurchaseRequest) -> Result<PurchaseReceipt> {
        let result = self.try_purchase(request).await;

        match &result {
            Ok(receipt) => {
                metrics::counter!("tickets.purchase.succeeded").increment(1);
                metrics::counter!("tickets.purchase.units").increment(u64::from(receipt.quantity));
                tracing::info!(
                    ticket_id = %receipt.ticket_id,
                    quantity = receipt.quantity,
                    "Tickets purchased"
                );
            }
            Err(err) => {
                metrics::counter!("tickets.purchase.rejected", "reason" => err.kind()).increment(1);
                if let InventoryError::Storage(source) = err {
                    tracing::error!(error = %source, "Purchase failed in storage layer");
                } else {
                    tracing::warn!(reason = err.kind(), error = %err, "Purchase rejected");
                }
            }
        }

        result
    }

    async fn try_purchase(&self, request: PurchaseRequest) -> Result<PurchaseReceipt> {
        let quantity = self.validate_quantity(request.quantity)?;
        let selector = TicketSelector::from_parts(
            request.ticket_id,
            request.event_id,
            request.ticket_type.as_deref(),
        )?;
        let ticket_id = lookup::resolve(self.store.as_ref(), &selector).await?;

        if self.store.purchase(ticket_id, quantity).await? {
            return Ok(PurchaseReceipt {
                ticket_id,
                quantity,
                status: PurchaseStatus::Purchased,
            });
        }

        // The conditional update does not say why it matched nothing.
        match self.store.get(ticket_id).await? {
            None => Err(InventoryError::NotFound(format!("ticket {ticket_id}"))),
            Some(_) => Err(InventoryError::InsufficientStock {
                ticket_id,
                requested: quantity,
            }),
        }
    }

    fn validate_quantity(&self, quantity: Option<i64>) -> Result<u32> {
        let quantity = quantity.ok_or_else(|| InventoryError::invalid("quantity is required"))?;
        if quantity <= 0 {
            return Err(InventoryError::invalid("quantity must be a positive integer"));
        }

        let max = self.policy.max_quantity_per_purchase;
        match u32::try_from(quantity) {
            Ok(quantity) if quantity <= max => Ok(quantity),
            _ => Err(InventoryError::invalid(format!(
                "cannot purchase more than {max} tickets per transaction"
            ))),
        }
    }

    /// Read current stock for an (event, type) pair.
    ///
    /// A pair with no record, including an unknown ticket type, reports zero
    /// availability rather than an error.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::InvalidRequest`]: either argument missing
    /// - [`InventoryError::Storage`]: the store failed
    #[tracing::instrument(skip(self))]
    pub async fn check_availability(
        &self,
        event_id: Option<EventId>,
        ticket_type: Option<&str>,
    ) -> Result<Availability> {
        let (Some(event_id), Some(ticket_type)) =
            (event_id, ticket_type.map(str::trim).filter(|t| !t.is_empty()))
        else {
            return Err(InventoryError::invalid("eventId and ticketType are required"));
        };

        metrics::counter!("tickets.availability.queries").increment(1);

        let record =
            lookup::find_by_event_and_type_str(self.store.as_ref(), event_id, ticket_type).await?;

        Ok(record.as_ref().map_or(Availability::NONE, Availability::of))
    }

    /// Create a ticket record.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::InvalidRequest`]: unknown type, negative price or quantity
    /// - [`InventoryError::Conflict`]: the (event, type) pair already has a record
    /// - [`InventoryError::Storage`]: the store failed
    pub async fn create_ticket(&self, request: CreateTicketRequest) -> Result<TicketRecord> {
        let ticket = NewTicket {
            event_id: request.event_id,
            ticket_type: parse_ticket_type(&request.ticket_type)?,
            unit_price: parse_price(request.unit_price_cents)?,
            quantity_available: parse_stock(request.quantity_available)?,
        };

        let record = self.store.create(ticket).await?;
        tracing::info!(
            ticket_id = %record.id,
            event_id = ?record.event_id,
            ticket_type = %record.ticket_type,
            quantity_available = record.quantity_available,
            "Ticket created"
        );
        Ok(record)
    }

    /// Load one ticket record.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::NotFound`]: no such record
    /// - [`InventoryError::Storage`]: the store failed
    pub async fn get_ticket(&self, id: TicketId) -> Result<TicketRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(format!("ticket {id}")))
    }

    /// List ticket records.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Storage`] if the store fails.
    pub async fn list_tickets(&self, pagination: Pagination) -> Result<Vec<TicketRecord>> {
        Ok(self.store.list(pagination).await?)
    }

    /// Apply an administrative update.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::InvalidRequest`]: no fields given, a field is invalid,
    ///   or the new stock plus units already sold exceeds [`MAX_TOTAL_UNITS`]
    /// - [`InventoryError::NotFound`]: no such record
    /// - [`InventoryError::Conflict`]: the new type collides with another record
    /// - [`InventoryError::Storage`]: the store failed
    pub async fn update_ticket(
        &self,
        id: TicketId,
        request: UpdateTicketRequest,
    ) -> Result<TicketRecord> {
        let update = TicketUpdate {
            ticket_type: request.ticket_type.as_deref().map(parse_ticket_type).transpose()?,
            unit_price: request.unit_price_cents.map(parse_price).transpose()?,
            quantity_available: request.quantity_available.map(parse_stock).transpose()?,
        };
        if update.is_empty() {
            return Err(InventoryError::invalid("no valid fields provided for update"));
        }
        if let Some(available) = update.quantity_available {
            // Purchases keep available + sold constant, so this holds until the write.
            let current = self.get_ticket(id).await?;
            let total = u64::from(available) + u64::from(current.quantity_sold);
            if total > u64::from(MAX_TOTAL_UNITS) {
                return Err(InventoryError::invalid(format!(
                    "quantityAvailable plus {} already sold cannot exceed {MAX_TOTAL_UNITS}",
                    current.quantity_sold
                )));
            }
        }

        let record = self
            .store
            .update(id, update)
            .await?
            .ok_or_else(|| InventoryError::NotFound(format!("ticket {id}")))?;
        tracing::info!(ticket_id = %id, "Ticket updated");
        Ok(record)
    }

    /// Delete a ticket record.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::NotFound`]: no such record
    /// - [`InventoryError::Storage`]: the store failed
    pub async fn delete_ticket(&self, id: TicketId) -> Result<()> {
        if self.store.delete(id).await? {
            tracing::info!(ticket_id = %id, "Ticket deleted");
            Ok(())
        } else {
            Err(InventoryError::NotFound(format!("ticket {id}")))
        }
    }

    /// Check the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Storage`] if the store does not answer.
    pub async fn ready(&self) -> Result<()> {
        Ok(self.store.ping().await?)
    }
}

fn parse_ticket_type(raw: &str) -> Result<TicketType> {
    raw.parse()
        .map_err(|e: crate::types::TicketTypeParseError| InventoryError::invalid(e.to_string()))
}

fn parse_price(cents: i64) -> Result<Money> {
    u64::try_from(cents)
        .map(Money::from_cents)
        .map_err(|_| InventoryError::invalid("unitPriceCents must be non-negative"))
}

// Stock is stored in a signed 32-bit column.
fn parse_stock(quantity: i64) -> Result<u32> {
    if quantity > i64::from(MAX_TOTAL_UNITS) {
        return Err(InventoryError::invalid(format!(
            "quantityAvailable cannot exceed {MAX_TOTAL_UNITS}"
        )));
    }
    u32::try_from(quantity)
        .map_err(|_| InventoryError::invalid("quantityAvailable must be a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_serializes_purchased_status() {
        let receipt = PurchaseReceipt {
            ticket_id: TicketId::new(),
            quantity: 2,
            status: PurchaseStatus::Purchased,
        };
        let json = serde_json::to_value(&receipt).unwrap_or_default();
        assert_eq!(json["status"], "purchased");
        assert_eq!(json["quantity"], 2);
        assert!(json.get("ticketId").is_some());
    }

    #[test]
    fn availability_serializes_camel_case() {
        let json = serde_json::to_value(Availability::NONE).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"available": false, "quantityAvailable": 0}));
    }

    #[test]
    fn price_and_stock_reject_negatives() {
        assert!(parse_price(-1).is_err());
        assert_eq!(parse_price(0).ok(), Some(Money::from_cents(0)));
        assert!(parse_stock(-5).is_err());
        assert!(parse_stock(i64::from(i32::MAX) + 1).is_err());
        assert_eq!(parse_stock(i64::from(i32::MAX)).ok(), Some(i32::MAX.unsigned_abs()));
    }
}
