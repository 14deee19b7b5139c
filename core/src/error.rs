//! Error taxonomy for inventory operations.

use crate::ticket_store::TicketStoreError;
use crate::types::TicketId;
use thiserror::Error;

/// Result type alias for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Failures surfaced by [`TicketInventory`](crate::TicketInventory).
///
/// Every variant except [`Storage`](InventoryError::Storage) is a final,
/// client-facing outcome. None of them is retried by the core.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Malformed input: missing or non-positive quantity, missing identifying
    /// fields, or an unparseable ticket type where one is required.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No ticket record matches the given id or (event, type) pair.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The atomic purchase found fewer units available than requested.
    #[error("Insufficient stock for ticket {ticket_id}: requested {requested}")]
    InsufficientStock {
        /// Ticket the purchase targeted.
        ticket_id: TicketId,
        /// Units requested.
        requested: u32,
    },

    /// The request collides with an existing record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage layer failure (connectivity, corruption).
    #[error("Storage error: {0}")]
    Storage(#[source] TicketStoreError),
}

impl InventoryError {
    /// Short label used for metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage",
        }
    }

    /// Build an `InvalidRequest` error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

impl From<TicketStoreError> for InventoryError {
    fn from(err: TicketStoreError) -> Self {
        match err {
            TicketStoreError::DuplicateTicket { .. } => Self::Conflict(err.to_string()),
            other => Self::Storage(other),
        }
    }
}
