//! Property tests: stock is conserved and never oversold.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use proptest::prelude::*;
use std::sync::Arc;
use ticketbooth_core::{InventoryError, PurchaseRequest, TicketInventory};
use ticketbooth_testing::{helpers, properties, InMemoryTicketStore};

proptest! {
    /// After any sequence of purchases, sold + available equals the initial
    /// stock, and every accepted purchase fit in what was left.
    #[test]
    fn prop_purchases_conserve_stock(
        initial in properties::initial_stock(),
        quantities in properties::purchase_quantities(),
    ) {
        let store = Arc::new(InMemoryTicketStore::new());
        let ticket = helpers::seed_ticket(&store, initial, 0);
        let inventory = TicketInventory::new(store.clone());

        let mut expected_available = initial;
        for quantity in quantities {
            let result = tokio_test::block_on(inventory.purchase_ticket(PurchaseRequest {
                ticket_id: Some(ticket.id),
                quantity: Some(i64::from(quantity)),
                ..PurchaseRequest::default()
            }));

            match result {
                Ok(receipt) => {
                    prop_assert!(quantity >= 1);
                    prop_assert!(quantity <= expected_available);
                    prop_assert_eq!(receipt.quantity, quantity);
                    expected_available -= quantity;
                }
                Err(InventoryError::InsufficientStock { requested, .. }) => {
                    prop_assert_eq!(requested, quantity);
                    prop_assert!(quantity > expected_available);
                }
                Err(InventoryError::InvalidRequest(_)) => {
                    prop_assert!(quantity == 0 || quantity > 100);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
            }

            let record = store.snapshot(ticket.id).unwrap();
            prop_assert_eq!(record.quantity_available, expected_available);
            prop_assert_eq!(record.total_units(), u64::from(initial));
        }
    }

    /// Concurrent single-unit buyers sell exactly `min(stock, buyers)` units.
    #[test]
    fn prop_concurrent_buyers_never_oversell(stock in 0u32..30, buyers in 1usize..60) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .expect("Failed to build runtime");
        let store = Arc::new(InMemoryTicketStore::new());
        let ticket = helpers::seed_ticket(&store, stock, 0);
        let inventory = TicketInventory::new(store.clone());

        let successes = rt.block_on(async {
            let handles: Vec<_> = (0..buyers)
                .map(|_| {
                    let inventory = inventory.clone();
                    tokio::spawn(async move {
                        inventory
                            .purchase_ticket(PurchaseRequest {
                                ticket_id: Some(ticket.id),
                                quantity: Some(1),
                                ..PurchaseRequest::default()
                            })
                            .await
                            .is_ok()
                    })
                })
                .collect();
            futures::future::join_all(handles)
                .await
                .into_iter()
                .filter(|r| matches!(r, Ok(true)))
                .count()
        });

        let expected = usize::try_from(stock).unwrap().min(buyers);
        prop_assert_eq!(successes, expected);

        let record = store.snapshot(ticket.id).unwrap();
        prop_assert_eq!(record.quantity_sold as usize, expected);
        prop_assert_eq!(record.total_units(), u64::from(stock));
    }
}
