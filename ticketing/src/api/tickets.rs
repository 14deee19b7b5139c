//! Ticket endpoints.
//!
//! Handlers only translate between HTTP and [`TicketInventory`]; every
//! validation rule and status decision lives in the inventory service and
//! [`AppError`].
//!
//! [`TicketInventory`]: ticketbooth_core::TicketInventory

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use ticketbooth_core::{
    Availability, CreateTicketRequest, EventId, Pagination, PurchaseReceipt, PurchaseRequest,
    TicketId, TicketRecord, UpdateTicketRequest,
};
use ticketbooth_web::{ApiJson, ApiPath, ApiQuery, CorrelationId, WebResult};

/// Query string of `GET /api/tickets/availability`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// Event to look in
    pub event_id: Option<EventId>,
    /// Ticket type, also accepted as `type`
    #[serde(alias = "type")]
    pub ticket_type: Option<String>,
}

/// Query string of `GET /api/tickets`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Items per page, capped at [`Pagination::MAX_PAGE_SIZE`]
    pub page_size: Option<u32>,
}

/// Buy tickets.
///
/// ```text
/// POST /api/tickets/purchase
/// {"eventId": "...", "ticketType": "VIP", "quantity": 2}
/// ```
///
/// Responds 201 with `{ticketId, quantity, status: "purchased"}`.
///
/// # Errors
///
/// 400 for bad input, 404 for an unknown ticket, 409 `INSUFFICIENT_STOCK`
/// when fewer units remain than requested, 500 on storage failure.
pub async fn purchase_ticket(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> WebResult<(StatusCode, Json<PurchaseReceipt>)> {
    tracing::debug!(correlation_id = %correlation_id.0, "Purchase requested");
    let receipt = state.inventory.purchase_ticket(request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Report remaining stock for an (event, ticket type) pair.
///
/// ```text
/// GET /api/tickets/availability?eventId=...&ticketType=general
/// ```
///
/// A pair with no record answers `{"available": false, "quantityAvailable": 0}`.
///
/// # Errors
///
/// 400 when either parameter is missing, 500 on storage failure.
pub async fn check_availability(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AvailabilityQuery>,
) -> WebResult<Json<Availability>> {
    let availability = state
        .inventory
        .check_availability(query.event_id, query.ticket_type.as_deref())
        .await?;
    Ok(Json(availability))
}

/// Create a ticket record.
///
/// # Errors
///
/// 400 for invalid fields, 409 `CONFLICT` when the pair already exists.
pub async fn create_ticket(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTicketRequest>,
) -> WebResult<(StatusCode, Json<TicketRecord>)> {
    let record = state.inventory.create_ticket(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// List ticket records, oldest first.
///
/// # Errors
///
/// 400 for a non-numeric page, 500 on storage failure.
pub async fn list_tickets(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> WebResult<Json<Vec<TicketRecord>>> {
    let pagination = Pagination::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(Pagination::MAX_PAGE_SIZE),
    );
    Ok(Json(state.inventory.list_tickets(pagination).await?))
}

/// Fetch one ticket record.
///
/// # Errors
///
/// 400 for a malformed id, 404 when absent.
pub async fn get_ticket(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
) -> WebResult<Json<TicketRecord>> {
    Ok(Json(state.inventory.get_ticket(id).await?))
}

/// Update a ticket record.
///
/// # Errors
///
/// 400 for an empty or invalid update, 404 when absent, 409 on a type clash.
pub async fn update_ticket(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
    ApiJson(request): ApiJson<UpdateTicketRequest>,
) -> WebResult<Json<TicketRecord>> {
    Ok(Json(state.inventory.update_ticket(id, request).await?))
}

/// Delete a ticket record.
///
/// # Errors
///
/// 404 when absent.
pub async fn delete_ticket(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TicketId>,
) -> WebResult<StatusCode> {
    state.inventory.delete_ticket(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
