//! JSON API handlers.

pub mod tickets;
