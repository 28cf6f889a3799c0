use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserService;

/// Create routes for the users feature
///
/// Note: This feature requires authentication.
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/me", get(handlers::get_me))
        .route("/api/users/me/counter", put(handlers::assign_counter))
        .with_state(service)
}
