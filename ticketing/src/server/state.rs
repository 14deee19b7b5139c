//! Application state shared across HTTP handlers.

use ticketbooth_core::TicketInventory;

/// State handed to every handler.
///
/// Cloned per request; the inventory clones share one store.
#[derive(Clone)]
pub struct AppState {
    /// Ticket inventory service
    pub inventory: TicketInventory,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub const fn new(inventory: TicketInventory) -> Self {
        Self { inventory }
    }
}
