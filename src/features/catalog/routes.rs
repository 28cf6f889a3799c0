use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::catalog::handlers;
use crate::features::catalog::services::CatalogService;

/// Create routes for the catalog feature
///
/// Note: This feature requires authentication; mutations additionally
/// require the admin role.
pub fn routes(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route(
            "/api/services",
            get(handlers::list_services).post(handlers::create_service),
        )
        .route(
            "/api/services/{id}",
            get(handlers::get_service).put(handlers::update_service),
        )
        .route(
            "/api/services/{id}/types",
            get(handlers::list_service_types).post(handlers::create_service_type),
        )
        .route(
            "/api/services/{id}/counters",
            get(handlers::list_counters).post(handlers::create_counter),
        )
        .route("/api/counters/{id}", put(handlers::update_counter))
        .with_state(service)
}
