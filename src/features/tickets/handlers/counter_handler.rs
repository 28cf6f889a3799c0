use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::tickets::dtos::TicketResponseDto;
use crate::features::tickets::routes::TicketsState;
use crate::shared::types::ApiResponse;

/// Call the next waiting ticket to this counter
///
/// An empty queue is a normal outcome, not an error: the response is 200
/// with null data and an explanatory message.
#[utoipa::path(
    post,
    path = "/api/counters/{id}/call-next",
    params(("id" = Uuid, Path, description = "Counter ID")),
    responses(
        (status = 200, description = "Next ticket called, or none waiting", body = ApiResponse<TicketResponseDto>),
        (status = 404, description = "Counter not found"),
        (status = 409, description = "Counter already has an active ticket")
    ),
    security(("bearer_auth" = [])),
    tag = "counters"
)]
pub async fn call_next(
    _user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    match state.dispatch.call_next(id).await? {
        Some(ticket) => Ok(Json(ApiResponse::success(Some(ticket.into()), None, None))),
        None => Ok(Json(ApiResponse::success(
            None,
            Some("No tickets waiting".to_string()),
            None,
        ))),
    }
}

/// The ticket currently at this counter
#[utoipa::path(
    get,
    path = "/api/counters/{id}/current",
    params(("id" = Uuid, Path, description = "Counter ID")),
    responses(
        (status = 200, description = "Current ticket, or null when idle", body = ApiResponse<TicketResponseDto>),
        (status = 404, description = "Counter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "counters"
)]
pub async fn current(
    _user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    let current = state.dispatch.current(id).await?;
    Ok(Json(ApiResponse::success(
        current.map(Into::into),
        None,
        None,
    )))
}

/// Replay the call chime for this counter
#[utoipa::path(
    post,
    path = "/api/counters/{id}/ring",
    params(("id" = Uuid, Path, description = "Counter ID")),
    responses(
        (status = 200, description = "Bell rung"),
        (status = 404, description = "Counter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "counters"
)]
pub async fn ring_bell(
    _user: AuthenticatedUser,
    State(state): State<TicketsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.dispatch.ring_bell(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Bell rung".to_string()),
        None,
    )))
}
