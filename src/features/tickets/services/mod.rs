mod dispatch_service;
mod kiosk_service;
mod lifecycle_service;
mod transfer_service;

pub use dispatch_service::DispatchService;
pub use kiosk_service::KioskService;
pub use lifecycle_service::LifecycleService;
pub use transfer_service::TransferService;

use crate::core::error::AppError;
use crate::features::realtime::{Broadcaster, QueueEvent, Topic};
use crate::features::tickets::models::QueueTicket;
use crate::features::tickets::store::TransitionConflict;

/// Fan a ticket snapshot out to its counter, its service's displays and
/// the global channel. Fire-and-forget; runs after the write committed.
pub(crate) fn publish_ticket_update(bus: &dyn Broadcaster, ticket: &QueueTicket) {
    let event = QueueEvent::TicketUpdate {
        ticket: ticket.clone().into(),
    };
    if let Some(counter_id) = ticket.counter_id.or(ticket.last_counter_id) {
        bus.publish(&Topic::Counter(counter_id), &event);
    }
    bus.publish(&Topic::Service(ticket.service_id), &event);
    bus.publish(&Topic::Global, &event);
}

/// Map a rejected conditional write to the client-facing error.
pub(crate) fn conflict_error(conflict: TransitionConflict, action: &str) -> AppError {
    match conflict {
        TransitionConflict::NotFound => AppError::NotFound("Ticket not found".to_string()),
        TransitionConflict::StateChanged(status) => AppError::InvalidTransition(format!(
            "Cannot {} a ticket that is {}",
            action, status
        )),
        TransitionConflict::CounterOccupied => {
            AppError::CounterBusy("Counter already has an active ticket".to_string())
        }
    }
}
