use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::catalog::models::Counter;
use crate::features::realtime::{Broadcaster, QueueEvent, Topic};
use crate::features::tickets::models::{QueueTicket, TicketStatus};
use crate::features::tickets::store::{
    TicketStore, TransitionConflict, TransitionOutcome, TransitionRequest,
};

use super::publish_ticket_update;

/// Assigns waiting tickets to counters. The claim itself is a single
/// conditional write, so two counters calling at once can never both get
/// the same ticket; the loser just moves on to the next candidate.
pub struct DispatchService {
    store: Arc<dyn TicketStore>,
    bus: Arc<dyn Broadcaster>,
}

impl DispatchService {
    pub fn new(store: Arc<dyn TicketStore>, bus: Arc<dyn Broadcaster>) -> Self {
        Self { store, bus }
    }

    /// Call the next waiting ticket of the counter's service. Returns
    /// `None` when the queue is empty; a counter that already holds a
    /// called/serving ticket must finish with it first.
    pub async fn call_next(&self, counter_id: Uuid) -> Result<Option<QueueTicket>> {
        let counter = self.require_counter(counter_id).await?;

        if self.store.active_for_counter(counter_id).await?.is_some() {
            return Err(AppError::CounterBusy(
                "Counter already has an active ticket".to_string(),
            ));
        }

        // Each lost race means another counter claimed that candidate, so
        // the loop strictly consumes the queue and terminates.
        loop {
            let Some(candidate) = self.store.first_candidate(counter.service_id).await? else {
                return Ok(None);
            };

            let mut req = TransitionRequest::new(
                candidate.id,
                vec![TicketStatus::Pending, TicketStatus::Returning],
                TicketStatus::Called,
            );
            req.counter_id = Some(counter_id);

            match self.store.transition(req).await? {
                TransitionOutcome::Applied(ticket) => {
                    tracing::info!(
                        ticket = %ticket.label(),
                        counter = %counter.name,
                        "Ticket called"
                    );
                    publish_ticket_update(self.bus.as_ref(), &ticket);
                    return Ok(Some(ticket));
                }
                TransitionOutcome::Rejected(TransitionConflict::CounterOccupied) => {
                    return Err(AppError::CounterBusy(
                        "Counter already has an active ticket".to_string(),
                    ));
                }
                // Another counter took this candidate; try the next one.
                TransitionOutcome::Rejected(_) => continue,
            }
        }
    }

    /// The ticket currently called to or being served at a counter.
    pub async fn current(&self, counter_id: Uuid) -> Result<Option<QueueTicket>> {
        self.require_counter(counter_id).await?;
        self.store.active_for_counter(counter_id).await
    }

    /// Replay the audible alert for the counter's current call.
    pub async fn ring_bell(&self, counter_id: Uuid) -> Result<()> {
        let counter = self.require_counter(counter_id).await?;

        let event = QueueEvent::RingBell { counter_id };
        self.bus.publish(&Topic::Counter(counter_id), &event);
        self.bus.publish(&Topic::Service(counter.service_id), &event);
        self.bus.publish(&Topic::Global, &event);
        Ok(())
    }

    async fn require_counter(&self, counter_id: Uuid) -> Result<Counter> {
        self.store
            .counter(counter_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Counter not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::realtime::ChannelBroadcaster;
    use crate::features::tickets::store::memory::MemoryTicketStore;
    use crate::features::tickets::store::NewTicket;
    use chrono::{Duration, Utc};

    struct Fixture {
        store: Arc<MemoryTicketStore>,
        dispatch: DispatchService,
        service_id: Uuid,
        counter_id: Uuid,
    }

    fn setup() -> Fixture {
        let store = Arc::new(MemoryTicketStore::new());
        let bus = Arc::new(ChannelBroadcaster::new(16));
        let service = store.add_service("PAY", "Payments");
        let counter = store.add_counter(service.id, "C1", "Counter 1");
        Fixture {
            dispatch: DispatchService::new(store.clone(), bus),
            store,
            service_id: service.id,
            counter_id: counter.id,
        }
    }

    async fn issue(fx: &Fixture, number: i64, prioritized: bool, age_secs: i64) -> QueueTicket {
        let ticket = fx
            .store
            .insert_ticket(NewTicket {
                ticket_number: number,
                prefix: "PAY".to_string(),
                service_id: fx.service_id,
                is_prioritized: prioritized,
            })
            .await
            .unwrap();
        fx.store
            .backdate_ticket(ticket.id, Utc::now() - Duration::seconds(age_secs));
        ticket
    }

    #[tokio::test]
    async fn empty_queue_yields_none() {
        let fx = setup();
        let result = fx.dispatch.call_next(fx.counter_id).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn prioritized_tickets_jump_the_line() {
        let fx = setup();
        issue(&fx, 1, false, 300).await;
        let vip = issue(&fx, 2, true, 10).await;

        let called = fx.dispatch.call_next(fx.counter_id).await.unwrap().unwrap();
        assert_eq!(called.id, vip.id);
        assert_eq!(called.status, TicketStatus::Called);
        assert_eq!(called.counter_id, Some(fx.counter_id));
    }

    #[tokio::test]
    async fn same_priority_is_fifo_by_creation_time() {
        let fx = setup();
        let older = issue(&fx, 2, false, 300).await;
        issue(&fx, 1, false, 10).await;

        let called = fx.dispatch.call_next(fx.counter_id).await.unwrap().unwrap();
        assert_eq!(called.id, older.id);
    }

    #[tokio::test]
    async fn counter_with_active_ticket_cannot_call_again() {
        let fx = setup();
        issue(&fx, 1, false, 20).await;
        issue(&fx, 2, false, 10).await;

        fx.dispatch.call_next(fx.counter_id).await.unwrap().unwrap();
        let second = fx.dispatch.call_next(fx.counter_id).await;
        assert!(matches!(second, Err(AppError::CounterBusy(_))));
    }

    #[tokio::test]
    async fn two_counters_never_share_a_ticket() {
        let fx = setup();
        let other = fx.store.add_counter(fx.service_id, "C2", "Counter 2");
        let first = issue(&fx, 1, false, 20).await;
        let second = issue(&fx, 2, false, 10).await;

        let a = fx.dispatch.call_next(fx.counter_id).await.unwrap().unwrap();
        let b = fx.dispatch.call_next(other.id).await.unwrap().unwrap();

        assert_eq!(a.id, first.id);
        assert_eq!(b.id, second.id);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn simultaneous_calls_claim_distinct_tickets() {
        let fx = setup();
        let other = fx.store.add_counter(fx.service_id, "C2", "Counter 2");
        issue(&fx, 1, false, 20).await;
        issue(&fx, 2, false, 10).await;

        // Both counters race for the head of the queue; the loser of the
        // first claim retries against the next candidate.
        let (a, b) = tokio::join!(
            fx.dispatch.call_next(fx.counter_id),
            fx.dispatch.call_next(other.id)
        );
        let a = a.unwrap().unwrap();
        let b = b.unwrap().unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.counter_id, Some(fx.counter_id));
        assert_eq!(b.counter_id, Some(other.id));
    }

    #[tokio::test]
    async fn simultaneous_calls_for_the_last_ticket_have_one_winner() {
        let fx = setup();
        let other = fx.store.add_counter(fx.service_id, "C2", "Counter 2");
        let only = issue(&fx, 1, false, 10).await;

        let (a, b) = tokio::join!(
            fx.dispatch.call_next(fx.counter_id),
            fx.dispatch.call_next(other.id)
        );
        let called: Vec<QueueTicket> =
            [a.unwrap(), b.unwrap()].into_iter().flatten().collect();

        assert_eq!(called.len(), 1);
        assert_eq!(called[0].id, only.id);
        assert_eq!(called[0].status, TicketStatus::Called);
    }

    #[tokio::test]
    async fn unknown_counter_is_rejected() {
        let fx = setup();
        let result = fx.dispatch.call_next(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn current_reflects_the_called_ticket() {
        let fx = setup();
        issue(&fx, 1, false, 10).await;

        assert!(fx.dispatch.current(fx.counter_id).await.unwrap().is_none());
        let called = fx.dispatch.call_next(fx.counter_id).await.unwrap().unwrap();
        let current = fx.dispatch.current(fx.counter_id).await.unwrap().unwrap();
        assert_eq!(current.id, called.id);
    }

    #[tokio::test]
    async fn ring_bell_reaches_counter_subscribers() {
        let fx = setup();
        let bus = Arc::new(ChannelBroadcaster::new(16));
        let dispatch = DispatchService::new(fx.store.clone(), bus.clone());
        let mut rx = bus.subscribe(&Topic::Counter(fx.counter_id));

        dispatch.ring_bell(fx.counter_id).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, QueueEvent::RingBell { counter_id } if counter_id == fx.counter_id));
    }
}
