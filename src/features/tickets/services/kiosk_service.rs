use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::realtime::Broadcaster;
use crate::features::tickets::dtos::CreateTicketDto;
use crate::features::tickets::models::QueueTicket;
use crate::features::tickets::store::{NewTicket, TicketStore};

use super::publish_ticket_update;

/// Ticket issuing for the self-service kiosk. Unauthenticated by design;
/// the only input it trusts is a service id and a priority flag.
pub struct KioskService {
    store: Arc<dyn TicketStore>,
    bus: Arc<dyn Broadcaster>,
}

impl KioskService {
    pub fn new(store: Arc<dyn TicketStore>, bus: Arc<dyn Broadcaster>) -> Self {
        Self { store, bus }
    }

    /// Issue a pending ticket with the next number of the service's
    /// sequence. The service code doubles as the printed prefix.
    pub async fn create_ticket(&self, dto: CreateTicketDto) -> Result<QueueTicket> {
        let service = self
            .store
            .service(dto.service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

        let ticket_number = self.store.next_ticket_number(service.id).await?;
        let ticket = self
            .store
            .insert_ticket(NewTicket {
                ticket_number,
                prefix: service.code,
                service_id: service.id,
                is_prioritized: dto.is_prioritized,
            })
            .await?;

        tracing::info!(ticket = %ticket.label(), service = %service.name, "Ticket issued");
        publish_ticket_update(self.bus.as_ref(), &ticket);
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::realtime::{ChannelBroadcaster, QueueEvent, Topic};
    use crate::features::tickets::models::TicketStatus;
    use crate::features::tickets::store::memory::MemoryTicketStore;
    use uuid::Uuid;

    fn setup() -> (Arc<MemoryTicketStore>, Arc<ChannelBroadcaster>, KioskService) {
        let store = Arc::new(MemoryTicketStore::new());
        let bus = Arc::new(ChannelBroadcaster::new(16));
        let service = KioskService::new(store.clone(), bus.clone());
        (store, bus, service)
    }

    #[tokio::test]
    async fn issues_sequential_numbers_with_service_code_prefix() {
        let (store, _bus, kiosk) = setup();
        let payments = store.add_service("PAY", "Payments");

        let first = kiosk
            .create_ticket(CreateTicketDto {
                service_id: payments.id,
                is_prioritized: false,
            })
            .await
            .unwrap();
        let second = kiosk
            .create_ticket(CreateTicketDto {
                service_id: payments.id,
                is_prioritized: true,
            })
            .await
            .unwrap();

        assert_eq!(first.label(), "PAY-001");
        assert_eq!(second.label(), "PAY-002");
        assert_eq!(first.status, TicketStatus::Pending);
        assert!(second.is_prioritized);
    }

    #[tokio::test]
    async fn sequences_are_independent_per_service() {
        let (store, _bus, kiosk) = setup();
        let payments = store.add_service("PAY", "Payments");
        let permits = store.add_service("PRM", "Permits");

        for _ in 0..3 {
            kiosk
                .create_ticket(CreateTicketDto {
                    service_id: payments.id,
                    is_prioritized: false,
                })
                .await
                .unwrap();
        }
        let ticket = kiosk
            .create_ticket(CreateTicketDto {
                service_id: permits.id,
                is_prioritized: false,
            })
            .await
            .unwrap();

        assert_eq!(ticket.label(), "PRM-001");
    }

    #[tokio::test]
    async fn unknown_service_is_rejected() {
        let (_store, _bus, kiosk) = setup();
        let result = kiosk
            .create_ticket(CreateTicketDto {
                service_id: Uuid::new_v4(),
                is_prioritized: false,
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn issuing_notifies_the_service_channel() {
        let (store, bus, kiosk) = setup();
        let payments = store.add_service("PAY", "Payments");
        let mut rx = bus.subscribe(&Topic::Service(payments.id));

        let ticket = kiosk
            .create_ticket(CreateTicketDto {
                service_id: payments.id,
                is_prioritized: false,
            })
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        match event {
            QueueEvent::TicketUpdate { ticket: dto } => assert_eq!(dto.id, ticket.id),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
