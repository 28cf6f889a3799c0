use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::display::handlers;
use crate::features::display::services::DisplayService;

/// Create routes for the display feature
///
/// Note: Public; waiting-room screens carry no credentials.
pub fn routes(service: Arc<DisplayService>) -> Router {
    Router::new()
        .route("/api/display/services/{id}", get(handlers::service_board))
        .with_state(service)
}
