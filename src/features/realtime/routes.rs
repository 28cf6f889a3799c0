use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::realtime::broadcaster::Broadcaster;
use crate::features::realtime::handlers;

/// Create routes for the realtime event streams
///
/// Note: These are public; passive displays carry no credentials.
pub fn routes(bus: Arc<dyn Broadcaster>) -> Router {
    Router::new()
        .route("/api/events", get(handlers::global_events))
        .route("/api/events/services/{id}", get(handlers::service_events))
        .route("/api/events/counters/{id}", get(handlers::counter_events))
        .with_state(bus)
}
