use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::tickets::dtos::*;
use crate::features::tickets::routes::TicketsState;
use crate::shared::types::ApiResponse;

/// Get a ticket by ID
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket found", body = ApiResponse<TicketResponseDto>),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn get_ticket(
    _user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    let ticket = state
        .store
        .ticket(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;
    Ok(Json(ApiResponse::success(Some(ticket.into()), None, None)))
}

/// Start serving a called ticket
#[utoipa::path(
    put,
    path = "/api/tickets/{id}/serve",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = ServeTicketDto,
    responses(
        (status = 200, description = "Ticket is now being served", body = ApiResponse<TicketResponseDto>),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Ticket is not called at this counter")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn serve_ticket(
    _user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ServeTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    let ticket = state.lifecycle.serve(id, dto.counter_id).await?;
    Ok(Json(ApiResponse::success(Some(ticket.into()), None, None)))
}

/// Complete a ticket being served
#[utoipa::path(
    put,
    path = "/api/tickets/{id}/complete",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = CompleteTicketDto,
    responses(
        (status = 200, description = "Ticket served", body = ApiResponse<TicketResponseDto>),
        (status = 404, description = "Ticket or service type not found"),
        (status = 409, description = "Ticket is not serving at this counter")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn complete_ticket(
    user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CompleteTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let ticket = state
        .lifecycle
        .complete(id, dto.counter_id, dto.service_type_id, dto.remarks, &user.sub)
        .await?;
    Ok(Json(ApiResponse::success(Some(ticket.into()), None, None)))
}

/// Mark a called ticket as a no-show
#[utoipa::path(
    put,
    path = "/api/tickets/{id}/lapse",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = LapseTicketDto,
    responses(
        (status = 200, description = "Ticket lapsed", body = ApiResponse<TicketResponseDto>),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Ticket is not called at this counter")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn lapse_ticket(
    _user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<LapseTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    let ticket = state.lifecycle.lapse(id, dto.counter_id).await?;
    Ok(Json(ApiResponse::success(Some(ticket.into()), None, None)))
}

/// Cancel a ticket mid-service
#[utoipa::path(
    put,
    path = "/api/tickets/{id}/cancel",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = CancelTicketDto,
    responses(
        (status = 200, description = "Ticket cancelled", body = ApiResponse<TicketResponseDto>),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Ticket is not serving at this counter")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn cancel_ticket(
    user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CancelTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let ticket = state
        .lifecycle
        .cancel(id, dto.counter_id, dto.remarks, &user.sub)
        .await?;
    Ok(Json(ApiResponse::success(Some(ticket.into()), None, None)))
}

/// Call a lapsed ticket back to a counter
#[utoipa::path(
    put,
    path = "/api/tickets/{id}/recall",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = RecallTicketDto,
    responses(
        (status = 200, description = "Ticket called again", body = ApiResponse<TicketResponseDto>),
        (status = 404, description = "Ticket or counter not found"),
        (status = 409, description = "Ticket is not lapsed, or counter is busy")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn recall_ticket(
    _user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RecallTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    let ticket = state.lifecycle.recall(id, dto.counter_id).await?;
    Ok(Json(ApiResponse::success(Some(ticket.into()), None, None)))
}

/// Transfer a ticket to another service's queue
#[utoipa::path(
    put,
    path = "/api/tickets/{id}/transfer",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = TransferTicketDto,
    responses(
        (status = 200, description = "Ticket transferred", body = ApiResponse<TicketResponseDto>),
        (status = 400, description = "Destination equals the current service"),
        (status = 404, description = "Ticket or destination service not found"),
        (status = 409, description = "Ticket is not being handled at this counter")
    ),
    security(("bearer_auth" = [])),
    tag = "tickets"
)]
pub async fn transfer_ticket(
    _user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<TransferTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    let ticket = state
        .transfer
        .transfer(id, dto.counter_id, dto.service_id)
        .await?;
    Ok(Json(ApiResponse::success(Some(ticket.into()), None, None)))
}
