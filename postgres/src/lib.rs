//! `PostgreSQL` ticket store for Ticketbooth.
//!
//! This crate provides [`PostgresTicketStore`], the production implementation
//! of the `TicketStore` trait from `ticketbooth-core`. It supports:
//!
//! - Atomic conditional purchases (a single guarded `UPDATE`)
//! - Lookup by id and by (event, ticket type)
//! - Administrative create, list, update and delete
//! - Embedded schema migrations
//!
//! # Example
//!
//! ```ignore
//! use ticketbooth_postgres::PostgresTicketStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresTicketStore::connect("postgres://localhost/tickets").await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ticket_store;

pub use ticket_store::PostgresTicketStore;
