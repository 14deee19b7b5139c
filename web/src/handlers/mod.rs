//! HTTP request handlers shared by Ticketbooth services.

pub mod health;

pub use health::health_check;
