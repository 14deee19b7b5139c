//! Axum integration for Ticketbooth.
//!
//! The inventory core knows nothing about HTTP. This crate is the thin shell
//! between the two:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            HTTP shell (Axum)            │  ← JSON, query strings, paths
//! │  - Request extraction (400 on garbage)  │  ← Correlation IDs, metrics
//! │  - Error → status mapping               │
//! ├─────────────────────────────────────────┤
//! │          ticketbooth-core               │
//! │  - Validation and selector resolution   │
//! │  - Atomic purchase via TicketStore      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ticketbooth_web::{ApiJson, AppError};
//! use axum::{Router, routing::post, Json};
//!
//! async fn purchase(
//!     State(state): State<AppState>,
//!     ApiJson(request): ApiJson<PurchaseRequest>,
//! ) -> Result<Json<PurchaseReceipt>, AppError> {
//!     Ok(Json(state.inventory.purchase_ticket(request).await?))
//! }
//!
//! let app = Router::new()
//!     .route("/api/tickets/purchase", post(purchase))
//!     .layer(request_context_layer())
//!     .with_state(app_state);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ApiJson, ApiPath, ApiQuery, CorrelationId};
pub use middleware::{request_context_layer, CORRELATION_ID_HEADER};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
