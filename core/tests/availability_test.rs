//! Availability queries and ticket administration.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use std::sync::Arc;
use ticketbooth_core::{
    Availability, CreateTicketRequest, EventId, InventoryError, Money, Pagination,
    PurchaseRequest, TicketId, TicketInventory, TicketType, UpdateTicketRequest,
};
use ticketbooth_core::inventory::MAX_TOTAL_UNITS;
use ticketbooth_testing::{helpers, FailingTicketStore, InMemoryTicketStore};

fn setup() -> (Arc<InMemoryTicketStore>, TicketInventory) {
    let store = Arc::new(InMemoryTicketStore::new());
    let inventory = TicketInventory::new(store.clone());
    (store, inventory)
}

#[tokio::test]
async fn test_availability_for_missing_pair_is_zero() {
    let (_store, inventory) = setup();

    let availability = inventory
        .check_availability(Some(EventId::new()), Some("general"))
        .await
        .unwrap();

    assert_eq!(
        availability,
        Availability {
            available: false,
            quantity_available: 0
        }
    );
}

#[tokio::test]
async fn test_availability_for_unknown_type_is_zero() {
    let (_store, inventory) = setup();

    let availability = inventory
        .check_availability(Some(EventId::new()), Some("mezzanine"))
        .await
        .unwrap();

    assert_eq!(availability, Availability::NONE);
}

#[tokio::test]
async fn test_availability_requires_both_arguments() {
    let (store, inventory) = setup();

    for (event_id, ticket_type) in [
        (None, Some("general")),
        (Some(EventId::new()), None),
        (Some(EventId::new()), Some("")),
    ] {
        let err = inventory
            .check_availability(event_id, ticket_type)
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidRequest(_)));
    }
    assert_eq!(store.operation_count(), 0);
}

#[tokio::test]
async fn test_availability_reflects_purchases_only() {
    let (store, inventory) = setup();
    let event_id = EventId::new();
    let ticket = helpers::ticket_record(Some(event_id), TicketType::Vip, 3, 0);
    store.insert(ticket.clone());

    for _ in 0..5 {
        let availability = inventory
            .check_availability(Some(event_id), Some("VIP"))
            .await
            .unwrap();
        assert_eq!(availability.quantity_available, 3);
        assert!(availability.available);
    }
    assert_eq!(store.snapshot(ticket.id).unwrap(), ticket);

    inventory
        .purchase_ticket(PurchaseRequest {
            ticket_id: Some(ticket.id),
            quantity: Some(3),
            ..PurchaseRequest::default()
        })
        .await
        .unwrap();

    let availability = inventory
        .check_availability(Some(event_id), Some("vip"))
        .await
        .unwrap();
    assert_eq!(availability, Availability::NONE);
}

#[tokio::test]
async fn test_availability_storage_failure_propagates() {
    let inventory = TicketInventory::new(Arc::new(FailingTicketStore::default()));

    let err = inventory
        .check_availability(Some(EventId::new()), Some("general"))
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::Storage(_)));
}

#[tokio::test]
async fn test_create_ticket_validates_input() {
    let (_store, inventory) = setup();
    let valid = CreateTicketRequest {
        event_id: Some(EventId::new()),
        ticket_type: "General".to_string(),
        unit_price_cents: 4_500,
        quantity_available: 100,
    };

    let created = inventory.create_ticket(valid.clone()).await.unwrap();
    assert_eq!(created.ticket_type, TicketType::General);
    assert_eq!(created.unit_price, Money::from_cents(4_500));
    assert_eq!(created.quantity_sold, 0);

    let invalid = [
        CreateTicketRequest {
            ticket_type: "standing".to_string(),
            ..valid.clone()
        },
        CreateTicketRequest {
            unit_price_cents: -1,
            ..valid.clone()
        },
        CreateTicketRequest {
            quantity_available: -3,
            ..valid.clone()
        },
    ];
    for request in invalid {
        let err = inventory.create_ticket(request).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidRequest(_)), "{err:?}");
    }

    let duplicate = inventory.create_ticket(valid).await.unwrap_err();
    assert!(matches!(duplicate, InventoryError::Conflict(_)));
}

#[tokio::test]
async fn test_get_update_delete_ticket() {
    let (store, inventory) = setup();
    let ticket = helpers::seed_ticket(&store, 10, 0);

    assert_eq!(inventory.get_ticket(ticket.id).await.unwrap(), ticket);

    let empty = inventory
        .update_ticket(ticket.id, UpdateTicketRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(empty, InventoryError::InvalidRequest(_)));

    let updated = inventory
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                ticket_type: Some("vip".to_string()),
                quantity_available: Some(20),
                ..UpdateTicketRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.ticket_type, TicketType::Vip);
    assert_eq!(updated.quantity_available, 20);

    inventory.delete_ticket(ticket.id).await.unwrap();
    assert!(matches!(
        inventory.get_ticket(ticket.id).await,
        Err(InventoryError::NotFound(_))
    ));
    assert!(matches!(
        inventory.delete_ticket(ticket.id).await,
        Err(InventoryError::NotFound(_))
    ));
    assert!(matches!(
        inventory
            .update_ticket(
                TicketId::new(),
                UpdateTicketRequest {
                    unit_price_cents: Some(1),
                    ..UpdateTicketRequest::default()
                }
            )
            .await,
        Err(InventoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_stock_cannot_overflow_total_units() {
    let (store, inventory) = setup();
    let sold = MAX_TOTAL_UNITS - 5;
    let ticket = helpers::seed_ticket(&store, 0, sold);

    let err = inventory
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                quantity_available: Some(6),
                ..UpdateTicketRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::InvalidRequest(_)));
    assert_eq!(store.snapshot(ticket.id).unwrap().quantity_available, 0);

    let updated = inventory
        .update_ticket(
            ticket.id,
            UpdateTicketRequest {
                quantity_available: Some(5),
                ..UpdateTicketRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total_units(), u64::from(MAX_TOTAL_UNITS));

    // The record can then sell out without tripping the ceiling.
    let receipt = inventory
        .purchase_ticket(PurchaseRequest {
            ticket_id: Some(ticket.id),
            quantity: Some(5),
            ..PurchaseRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(receipt.quantity, 5);
    assert_eq!(store.snapshot(ticket.id).unwrap().quantity_sold, MAX_TOTAL_UNITS);
}

#[tokio::test]
async fn test_list_tickets() {
    let (store, inventory) = setup();
    for _ in 0..3 {
        helpers::seed_ticket(&store, 1, 0);
    }

    let all = inventory.list_tickets(Pagination::default()).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_ready_reports_store_health() {
    let (_store, inventory) = setup();
    inventory.ready().await.unwrap();

    let failing = TicketInventory::new(Arc::new(FailingTicketStore::default()));
    assert!(failing.ready().await.is_err());
}
