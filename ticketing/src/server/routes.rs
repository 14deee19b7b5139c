//! Route table.

use super::{health::readiness_check, state::AppState};
use crate::api::tickets;
use axum::{
    routing::{get, post},
    Router,
};
use ticketbooth_web::{handlers::health::health_check, request_context_layer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router.
///
/// # Routes
///
/// - `GET /health` - Liveness
/// - `GET /ready` - Readiness (store ping)
/// - `POST /api/tickets/purchase` - Buy tickets
/// - `GET /api/tickets/availability` - Stock for an (event, type) pair
/// - `POST /api/tickets`, `GET /api/tickets` - Create, list
/// - `GET|PUT|DELETE /api/tickets/:id` - Read, update, delete
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/tickets/purchase", post(tickets::purchase_ticket))
        .route("/tickets/availability", get(tickets::check_availability))
        .route(
            "/tickets",
            post(tickets::create_ticket).get(tickets::list_tickets),
        )
        .route(
            "/tickets/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(request_context_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
