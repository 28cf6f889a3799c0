use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::catalog::dtos::*;
use crate::features::catalog::services::CatalogService;
use crate::shared::types::ApiResponse;

fn require_admin(user: &AuthenticatedUser) -> Result<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Catalog management requires admin role".to_string(),
        ))
    }
}

/// Create a service
#[utoipa::path(
    post,
    path = "/api/services",
    request_body = CreateServiceDto,
    responses(
        (status = 201, description = "Service created", body = ApiResponse<ServiceResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_service(
    user: AuthenticatedUser,
    State(service): State<Arc<CatalogService>>,
    AppJson(dto): AppJson<CreateServiceDto>,
) -> Result<Json<ApiResponse<ServiceResponseDto>>> {
    require_admin(&user)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = service.create_service(dto).await?;
    Ok(Json(ApiResponse::success(Some(created), None, None)))
}

/// List services
#[utoipa::path(
    get,
    path = "/api/services",
    responses(
        (status = 200, description = "List of services", body = ApiResponse<Vec<ServiceResponseDto>>),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn list_services(
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<ApiResponse<Vec<ServiceResponseDto>>>> {
    let services = service.list_services().await?;
    Ok(Json(ApiResponse::success(Some(services), None, None)))
}

/// Get service by ID
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service found", body = ApiResponse<ServiceResponseDto>),
        (status = 404, description = "Service not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn get_service(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ServiceResponseDto>>> {
    let found = service.get_service(id).await?;
    Ok(Json(ApiResponse::success(Some(found), None, None)))
}

/// Rename a service
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = UpdateServiceDto,
    responses(
        (status = 200, description = "Service updated", body = ApiResponse<ServiceResponseDto>),
        (status = 404, description = "Service not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn update_service(
    user: AuthenticatedUser,
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateServiceDto>,
) -> Result<Json<ApiResponse<ServiceResponseDto>>> {
    require_admin(&user)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = service.update_service(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(updated), None, None)))
}

/// Create a service type under a service
#[utoipa::path(
    post,
    path = "/api/services/{id}/types",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = CreateServiceTypeDto,
    responses(
        (status = 201, description = "Service type created", body = ApiResponse<ServiceTypeResponseDto>),
        (status = 404, description = "Service not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_service_type(
    user: AuthenticatedUser,
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateServiceTypeDto>,
) -> Result<Json<ApiResponse<ServiceTypeResponseDto>>> {
    require_admin(&user)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = service.create_service_type(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(created), None, None)))
}

/// List service types of a service
#[utoipa::path(
    get,
    path = "/api/services/{id}/types",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "List of service types", body = ApiResponse<Vec<ServiceTypeResponseDto>>),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn list_service_types(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ServiceTypeResponseDto>>>> {
    let types = service.list_service_types(id).await?;
    Ok(Json(ApiResponse::success(Some(types), None, None)))
}

/// Create a counter under a service
#[utoipa::path(
    post,
    path = "/api/services/{id}/counters",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = CreateCounterDto,
    responses(
        (status = 201, description = "Counter created", body = ApiResponse<CounterResponseDto>),
        (status = 404, description = "Service not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_counter(
    user: AuthenticatedUser,
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateCounterDto>,
) -> Result<Json<ApiResponse<CounterResponseDto>>> {
    require_admin(&user)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = service.create_counter(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(created), None, None)))
}

/// List counters of a service
#[utoipa::path(
    get,
    path = "/api/services/{id}/counters",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "List of counters", body = ApiResponse<Vec<CounterResponseDto>>),
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn list_counters(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CounterResponseDto>>>> {
    let counters = service.list_counters(id).await?;
    Ok(Json(ApiResponse::success(Some(counters), None, None)))
}

/// Rename a counter
#[utoipa::path(
    put,
    path = "/api/counters/{id}",
    params(("id" = Uuid, Path, description = "Counter ID")),
    request_body = UpdateCounterDto,
    responses(
        (status = 200, description = "Counter updated", body = ApiResponse<CounterResponseDto>),
        (status = 404, description = "Counter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn update_counter(
    user: AuthenticatedUser,
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCounterDto>,
) -> Result<Json<ApiResponse<CounterResponseDto>>> {
    require_admin(&user)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = service.update_counter(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(updated), None, None)))
}
