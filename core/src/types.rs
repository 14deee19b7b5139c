//! Domain types for ticket inventory.
//!
//! Identifiers, the closed set of ticket categories, money, and the
//! [`TicketRecord`] row that the store persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a ticket record
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the event a ticket belongs to.
///
/// Ownership of events lives outside this crate; the id is carried as an
/// opaque reference and never checked for existence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Ticket type
// ============================================================================

/// Category of a ticket.
///
/// Input is matched case-insensitively; [`TicketType::as_str`] gives the
/// canonical spelling used on the wire and in storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TicketType {
    /// General admission
    General,
    /// VIP access
    Vip,
}

impl TicketType {
    /// All known ticket types.
    pub const ALL: [Self; 2] = [Self::General, Self::Vip];

    /// Canonical string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Vip => "VIP",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known [`TicketType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ticket type: {0:?}")]
pub struct TicketTypeParseError(pub String);

impl FromStr for TicketType {
    type Err = TicketTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TicketTypeParseError(s.to_string()))
    }
}

impl Serialize for TicketType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TicketType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Money
// ============================================================================

/// Non-negative amount of money in cents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Ticket record
// ============================================================================

/// Inventory row for one (event, ticket type) combination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    /// Record identifier
    pub id: TicketId,
    /// Owning event, if any
    pub event_id: Option<EventId>,
    /// Ticket category
    pub ticket_type: TicketType,
    /// Price of one unit
    #[serde(rename = "unitPriceCents")]
    pub unit_price: Money,
    /// Units not yet sold
    pub quantity_available: u32,
    /// Units sold to date
    pub quantity_sold: u32,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

impl TicketRecord {
    /// Total units this record has ever held (`available + sold`).
    ///
    /// Purchases move units between the two counters, so this stays fixed
    /// until an administrative update changes `quantity_available`.
    #[must_use]
    pub const fn total_units(&self) -> u64 {
        self.quantity_available as u64 + self.quantity_sold as u64
    }

    /// Whether at least one unit can still be bought.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.quantity_available > 0
    }
}

/// Input for creating a ticket record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTicket {
    /// Owning event, if any
    pub event_id: Option<EventId>,
    /// Ticket category
    pub ticket_type: TicketType,
    /// Price of one unit
    pub unit_price: Money,
    /// Initial stock
    pub quantity_available: u32,
}

/// Partial administrative update of a ticket record.
///
/// `quantity_sold` is not updatable here; it only moves through purchases.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketUpdate {
    /// New category
    pub ticket_type: Option<TicketType>,
    /// New unit price
    pub unit_price: Option<Money>,
    /// New remaining stock
    pub quantity_available: Option<u32>,
}

impl TicketUpdate {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ticket_type.is_none() && self.unit_price.is_none() && self.quantity_available.is_none()
    }
}

/// 1-based page selection for listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// Page number, starting at 1
    pub page: u32,
    /// Items per page
    pub page_size: u32,
}

impl Pagination {
    /// Largest accepted page size.
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Build a pagination, clamping to `1..` pages and `1..=MAX_PAGE_SIZE` items.
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, Self::MAX_PAGE_SIZE)
    }
}
