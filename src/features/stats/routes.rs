use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::stats::handlers;
use crate::features::stats::services::StatsService;

/// Create routes for the reports feature
///
/// Note: This feature requires authentication; service-wide reports
/// additionally require the admin role.
pub fn routes(service: Arc<StatsService>) -> Router {
    Router::new()
        .route("/api/reports/me", get(handlers::my_report))
        .route("/api/reports/services/{id}", get(handlers::service_report))
        .with_state(service)
}
