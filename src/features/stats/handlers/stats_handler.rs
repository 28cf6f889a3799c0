use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::stats::dtos::{QueueReportDto, ReportQuery};
use crate::features::stats::services::StatsService;
use crate::features::tickets::store::ReportScope;
use crate::shared::types::ApiResponse;

/// Served-ticket report for the authenticated staff member
#[utoipa::path(
    get,
    path = "/api/reports/me",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report for the caller", body = ApiResponse<QueueReportDto>),
        (status = 400, description = "Invalid date range")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn my_report(
    user: AuthenticatedUser,
    State(service): State<Arc<StatsService>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<QueueReportDto>>> {
    let report = service
        .report(
            ReportScope::User(user.sub.clone()),
            query.start_date,
            query.end_date,
        )
        .await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Served-ticket report for a service
#[utoipa::path(
    get,
    path = "/api/reports/services/{id}",
    params(
        ("id" = Uuid, Path, description = "Service ID"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Report for the service", body = ApiResponse<QueueReportDto>),
        (status = 400, description = "Invalid date range"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn service_report(
    user: AuthenticatedUser,
    State(service): State<Arc<StatsService>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<QueueReportDto>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Service reports require admin role".to_string(),
        ));
    }

    let report = service
        .report(ReportScope::Service(id), query.start_date, query.end_date)
        .await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}
