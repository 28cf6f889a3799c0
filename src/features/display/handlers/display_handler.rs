use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::display::dtos::DisplayBoardDto;
use crate::features::display::services::DisplayService;
use crate::shared::types::ApiResponse;

/// Waiting-room board for a service
#[utoipa::path(
    get,
    path = "/api/display/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Current board", body = ApiResponse<DisplayBoardDto>),
        (status = 404, description = "Service not found")
    ),
    tag = "display"
)]
pub async fn service_board(
    State(service): State<Arc<DisplayService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DisplayBoardDto>>> {
    let board = service.board(id).await?;
    Ok(Json(ApiResponse::success(Some(board), None, None)))
}
