use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::display::dtos::{CounterBoardDto, DisplayBoardDto};
use crate::features::tickets::store::TicketStore;

/// Read model for the waiting-room displays.
pub struct DisplayService {
    store: Arc<dyn TicketStore>,
}

impl DisplayService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Current board of a service: every counter with its active ticket,
    /// plus the waiting count.
    pub async fn board(&self, service_id: Uuid) -> Result<DisplayBoardDto> {
        let service = self
            .store
            .service(service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

        let mut counters = Vec::new();
        for counter in self.store.counters_for_service(service_id).await? {
            let ticket = self.store.active_for_counter(counter.id).await?;
            counters.push(CounterBoardDto {
                counter: counter.into(),
                ticket: ticket.map(Into::into),
            });
        }

        Ok(DisplayBoardDto {
            service_id: service.id,
            service_name: service.name,
            waiting_count: self.store.waiting_count(service_id).await?,
            counters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::realtime::ChannelBroadcaster;
    use crate::features::tickets::services::DispatchService;
    use crate::features::tickets::store::memory::MemoryTicketStore;
    use crate::features::tickets::store::NewTicket;

    #[tokio::test]
    async fn board_shows_counters_active_tickets_and_waiting_count() {
        let store = Arc::new(MemoryTicketStore::new());
        let service = store.add_service("PAY", "Payments");
        let busy = store.add_counter(service.id, "C1", "Counter 1");
        store.add_counter(service.id, "C2", "Counter 2");

        for n in 1..=3 {
            store
                .insert_ticket(NewTicket {
                    ticket_number: n,
                    prefix: "PAY".to_string(),
                    service_id: service.id,
                    is_prioritized: false,
                })
                .await
                .unwrap();
        }
        let bus = Arc::new(ChannelBroadcaster::new(16));
        let dispatch = DispatchService::new(store.clone(), bus);
        let called = dispatch.call_next(busy.id).await.unwrap().unwrap();

        let display = DisplayService::new(store);
        let board = display.board(service.id).await.unwrap();

        assert_eq!(board.service_name, "Payments");
        assert_eq!(board.waiting_count, 2);
        assert_eq!(board.counters.len(), 2);

        let busy_entry = board
            .counters
            .iter()
            .find(|c| c.counter.id == busy.id)
            .unwrap();
        assert_eq!(busy_entry.ticket.as_ref().unwrap().id, called.id);
        let idle_entry = board
            .counters
            .iter()
            .find(|c| c.counter.id != busy.id)
            .unwrap();
        assert!(idle_entry.ticket.is_none());
    }

    #[tokio::test]
    async fn unknown_service_is_rejected() {
        let store = Arc::new(MemoryTicketStore::new());
        let display = DisplayService::new(store);
        let result = display.board(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
