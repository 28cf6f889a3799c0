use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::realtime::{Broadcaster, QueueEvent, Topic};
use crate::features::tickets::models::QueueTicket;
use crate::features::tickets::store::{TicketStore, TransitionOutcome, TransitionRequest};

use super::{conflict_error, publish_ticket_update};

/// Moves a ticket being handled at one counter into another service's
/// queue. The ticket keeps its printed number and prefix and re-enters
/// the destination as returning, so it is picked up ahead of nothing but
/// ordered by its original creation time.
pub struct TransferService {
    store: Arc<dyn TicketStore>,
    bus: Arc<dyn Broadcaster>,
}

impl TransferService {
    pub fn new(store: Arc<dyn TicketStore>, bus: Arc<dyn Broadcaster>) -> Self {
        Self { store, bus }
    }

    pub async fn transfer(
        &self,
        ticket_id: Uuid,
        counter_id: Uuid,
        dest_service_id: Uuid,
    ) -> Result<QueueTicket> {
        let ticket = self
            .store
            .ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;
        let origin_service_id = ticket.service_id;

        if dest_service_id == origin_service_id {
            return Err(AppError::Validation(
                "Destination service must differ from the ticket's current service".to_string(),
            ));
        }
        let dest = self
            .store
            .service(dest_service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Destination service not found".to_string()))?;

        let mut req = TransitionRequest::transfer(ticket_id);
        req.expected_counter = Some(counter_id);
        req.service_id = Some(dest_service_id);

        match self.store.transition(req).await? {
            TransitionOutcome::Applied(ticket) => {
                tracing::info!(
                    ticket = %ticket.label(),
                    destination = %dest.name,
                    "Ticket transferred"
                );
                // The destination learns through the regular fan-out; the
                // origin's displays still show the ticket and need the
                // update too.
                publish_ticket_update(self.bus.as_ref(), &ticket);
                self.bus.publish(
                    &Topic::Service(origin_service_id),
                    &QueueEvent::TicketUpdate {
                        ticket: ticket.clone().into(),
                    },
                );
                Ok(ticket)
            }
            TransitionOutcome::Rejected(conflict) => Err(conflict_error(conflict, "transfer")),
        }
    }
}
