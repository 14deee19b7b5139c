//! Resolution of purchase requests to concrete ticket ids.

use crate::error::{InventoryError, Result};
use crate::ticket_store::{TicketStore, TicketStoreError};
use crate::types::{EventId, TicketId, TicketRecord, TicketType};

/// How a request identifies the ticket it targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketSelector {
    /// Explicit ticket id, used as-is.
    Id(TicketId),
    /// Event plus free-form ticket type, resolved through the store.
    EventAndType {
        /// Owning event.
        event_id: EventId,
        /// Ticket type as the client sent it.
        ticket_type: String,
    },
}

impl TicketSelector {
    /// Build a selector from optional request fields.
    ///
    /// An explicit id wins over the pair. A blank ticket type counts as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidRequest`] if neither an id nor a
    /// complete (event, type) pair is present.
    pub fn from_parts(
        ticket_id: Option<TicketId>,
        event_id: Option<EventId>,
        ticket_type: Option<&str>,
    ) -> Result<Self> {
        if let Some(id) = ticket_id {
            return Ok(Self::Id(id));
        }

        match (event_id, ticket_type.map(str::trim).filter(|t| !t.is_empty())) {
            (Some(event_id), Some(ticket_type)) => Ok(Self::EventAndType {
                event_id,
                ticket_type: ticket_type.to_string(),
            }),
            _ => Err(InventoryError::invalid(
                "ticketId or (eventId + ticketType) required",
            )),
        }
    }
}

/// Find the record for an (event, free-form type) pair.
///
/// A type string that does not name a known [`TicketType`] yields `Ok(None)`
/// rather than an error: in lookup paths an unknown type simply means there is
/// no such ticket.
///
/// # Errors
///
/// Propagates store failures.
pub async fn find_by_event_and_type_str<S>(
    store: &S,
    event_id: EventId,
    ticket_type: &str,
) -> std::result::Result<Option<TicketRecord>, TicketStoreError>
where
    S: TicketStore + ?Sized,
{
    let Ok(ticket_type) = ticket_type.parse::<TicketType>() else {
        tracing::debug!(%event_id, ticket_type, "Unknown ticket type in lookup");
        return Ok(None);
    };

    store.find_by_event_and_type(event_id, ticket_type).await
}

/// Resolve a selector to a ticket id.
///
/// # Errors
///
/// - [`InventoryError::NotFound`] if a pair selector matches no record
/// - [`InventoryError::Storage`] on store failure
pub async fn resolve<S>(store: &S, selector: &TicketSelector) -> Result<TicketId>
where
    S: TicketStore + ?Sized,
{
    match selector {
        TicketSelector::Id(id) => Ok(*id),
        TicketSelector::EventAndType {
            event_id,
            ticket_type,
        } => find_by_event_and_type_str(store, *event_id, ticket_type)
            .await?
            .map(|record| record.id)
            .ok_or_else(|| {
                InventoryError::NotFound(format!(
                    "{ticket_type} ticket for event {event_id}"
                ))
            }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn explicit_id_wins() {
        let id = TicketId::new();
        let selector =
            TicketSelector::from_parts(Some(id), Some(EventId::new()), Some("vip")).unwrap();
        assert_eq!(selector, TicketSelector::Id(id));
    }

    #[test]
    fn pair_requires_both_fields() {
        assert!(matches!(
            TicketSelector::from_parts(None, Some(EventId::new()), None),
            Err(InventoryError::InvalidRequest(_))
        ));
        assert!(matches!(
            TicketSelector::from_parts(None, None, Some("general")),
            Err(InventoryError::InvalidRequest(_))
        ));
        assert!(matches!(
            TicketSelector::from_parts(None, Some(EventId::new()), Some("   ")),
            Err(InventoryError::InvalidRequest(_))
        ));
    }

    #[test]
    fn pair_keeps_raw_type() {
        let event_id = EventId::new();
        let selector = TicketSelector::from_parts(None, Some(event_id), Some(" Vip ")).unwrap();
        assert_eq!(
            selector,
            TicketSelector::EventAndType {
                event_id,
                ticket_type: "Vip".to_string()
            }
        );
    }
}
