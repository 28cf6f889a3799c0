use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::tickets::handlers;
use crate::features::tickets::services::{
    DispatchService, KioskService, LifecycleService, TransferService,
};
use crate::features::tickets::store::TicketStore;

/// Shared state of the queue engines. Every engine sits on the same
/// store and bus, so cloning the state is cheap.
#[derive(Clone)]
pub struct TicketsState {
    pub store: Arc<dyn TicketStore>,
    pub kiosk: Arc<KioskService>,
    pub dispatch: Arc<DispatchService>,
    pub lifecycle: Arc<LifecycleService>,
    pub transfer: Arc<TransferService>,
}

/// Create the unauthenticated kiosk route
pub fn public_routes(state: TicketsState) -> Router {
    Router::new()
        .route("/api/kiosk/tickets", post(handlers::create_ticket))
        .with_state(state)
}

/// Create the authenticated counter and ticket routes
pub fn routes(state: TicketsState) -> Router {
    Router::new()
        .route("/api/counters/{id}/call-next", post(handlers::call_next))
        .route("/api/counters/{id}/current", get(handlers::current))
        .route("/api/counters/{id}/ring", post(handlers::ring_bell))
        .route("/api/tickets/{id}", get(handlers::get_ticket))
        .route("/api/tickets/{id}/serve", put(handlers::serve_ticket))
        .route("/api/tickets/{id}/complete", put(handlers::complete_ticket))
        .route("/api/tickets/{id}/lapse", put(handlers::lapse_ticket))
        .route("/api/tickets/{id}/cancel", put(handlers::cancel_ticket))
        .route("/api/tickets/{id}/recall", put(handlers::recall_ticket))
        .route("/api/tickets/{id}/transfer", put(handlers::transfer_ticket))
        .with_state(state)
}
