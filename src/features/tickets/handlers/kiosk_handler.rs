use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::tickets::dtos::{CreateTicketDto, TicketResponseDto};
use crate::features::tickets::routes::TicketsState;
use crate::shared::types::ApiResponse;

/// Issue a new queue ticket from the kiosk
#[utoipa::path(
    post,
    path = "/api/kiosk/tickets",
    request_body = CreateTicketDto,
    responses(
        (status = 200, description = "Ticket issued", body = ApiResponse<TicketResponseDto>),
        (status = 404, description = "Service not found")
    ),
    tag = "kiosk"
)]
pub async fn create_ticket(
    State(state): State<TicketsState>,
    AppJson(dto): AppJson<CreateTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    let ticket = state.kiosk.create_ticket(dto).await?;
    Ok(Json(ApiResponse::success(Some(ticket.into()), None, None)))
}
