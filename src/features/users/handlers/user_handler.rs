use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{AssignCounterDto, UserResponseDto};
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Caller's profile", body = ApiResponse<UserResponseDto>),
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.get_or_create(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile.into()), None, None)))
}

/// Set the counter the caller works at
#[utoipa::path(
    put,
    path = "/api/users/me/counter",
    request_body = AssignCounterDto,
    responses(
        (status = 200, description = "Counter assignment updated", body = ApiResponse<UserResponseDto>),
        (status = 404, description = "Counter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn assign_counter(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<AssignCounterDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.assign_counter(&user, dto.counter_id).await?;
    Ok(Json(ApiResponse::success(Some(profile.into()), None, None)))
}
