use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::realtime::{Broadcaster, QueueEvent, Topic};
use crate::features::stats::StatsService;
use crate::features::tickets::models::{QueueTicket, TicketStatus};
use crate::features::tickets::store::{TicketStore, TransitionOutcome, TransitionRequest};

use super::{conflict_error, publish_ticket_update};

/// Counter-side ticket lifecycle: serve, complete, lapse, cancel, recall.
/// Every operation is one conditional write guarded on the status and the
/// counter binding the caller believes it holds.
pub struct LifecycleService {
    store: Arc<dyn TicketStore>,
    bus: Arc<dyn Broadcaster>,
    stats: Arc<StatsService>,
}

impl LifecycleService {
    pub fn new(
        store: Arc<dyn TicketStore>,
        bus: Arc<dyn Broadcaster>,
        stats: Arc<StatsService>,
    ) -> Self {
        Self { store, bus, stats }
    }

    /// Customer arrived: called becomes serving, stamping serving_start.
    pub async fn serve(&self, ticket_id: Uuid, counter_id: Uuid) -> Result<QueueTicket> {
        let to = TicketStatus::Serving;
        let mut req = TransitionRequest::new(ticket_id, TicketStatus::sources_of(to), to);
        req.expected_counter = Some(counter_id);
        req.counter_id = Some(counter_id);
        req.serving_start = Some(Utc::now());

        self.apply(req, "serve").await
    }

    /// Finish serving. Records what the visit was about, who handled it
    /// and when it ended, then frees the counter.
    pub async fn complete(
        &self,
        ticket_id: Uuid,
        counter_id: Uuid,
        service_type_id: Uuid,
        remarks: Option<String>,
        served_by: &str,
    ) -> Result<QueueTicket> {
        let ticket = self
            .store
            .ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;
        let service_type = self
            .store
            .service_type(service_type_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service type not found".to_string()))?;
        if service_type.service_id != ticket.service_id {
            return Err(AppError::ServiceMismatch(
                "Service type does not belong to the ticket's service".to_string(),
            ));
        }

        let to = TicketStatus::Served;
        let mut req = TransitionRequest::new(ticket_id, TicketStatus::sources_of(to), to);
        req.expected_counter = Some(counter_id);
        req.service_type_id = Some(service_type_id);
        req.serving_end = Some(Utc::now());
        req.remarks = remarks;
        req.served_by = Some(served_by.to_string());

        let ticket = self.apply(req, "complete").await?;

        // Refresh the staff console's totals off the request path.
        let stats = self.stats.clone();
        let bus = self.bus.clone();
        let username = served_by.to_string();
        tokio::spawn(async move {
            Self::push_staff_totals(stats, bus, counter_id, username).await;
        });

        Ok(ticket)
    }

    /// Customer did not show up; the ticket parks as lapsed and stays
    /// re-callable by id.
    pub async fn lapse(&self, ticket_id: Uuid, counter_id: Uuid) -> Result<QueueTicket> {
        let to = TicketStatus::Lapsed;
        let mut req = TransitionRequest::new(ticket_id, TicketStatus::sources_of(to), to);
        req.expected_counter = Some(counter_id);

        self.apply(req, "lapse").await
    }

    /// Abort mid-service. Terminal; the visit never counts as served.
    pub async fn cancel(
        &self,
        ticket_id: Uuid,
        counter_id: Uuid,
        remarks: Option<String>,
        cancelled_by: &str,
    ) -> Result<QueueTicket> {
        let to = TicketStatus::Cancelled;
        let mut req = TransitionRequest::new(ticket_id, TicketStatus::sources_of(to), to);
        req.expected_counter = Some(counter_id);
        req.serving_end = Some(Utc::now());
        req.remarks = remarks;
        req.served_by = Some(cancelled_by.to_string());

        self.apply(req, "cancel").await
    }

    /// Call a lapsed ticket back, to any counter of its service.
    pub async fn recall(&self, ticket_id: Uuid, counter_id: Uuid) -> Result<QueueTicket> {
        let ticket = self
            .store
            .ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;
        let counter = self
            .store
            .counter(counter_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Counter not found".to_string()))?;
        if counter.service_id != ticket.service_id {
            return Err(AppError::ServiceMismatch(
                "Counter does not belong to the ticket's service".to_string(),
            ));
        }

        // Narrower than the table on purpose: pending and returning
        // tickets reach Called only through dispatch order, never by id.
        let mut req =
            TransitionRequest::new(ticket_id, vec![TicketStatus::Lapsed], TicketStatus::Called);
        req.counter_id = Some(counter_id);

        self.apply(req, "recall").await
    }

    async fn apply(&self, req: TransitionRequest, action: &str) -> Result<QueueTicket> {
        match self.store.transition(req).await? {
            TransitionOutcome::Applied(ticket) => {
                tracing::info!(ticket = %ticket.label(), status = %ticket.status, "Ticket {}", action);
                publish_ticket_update(self.bus.as_ref(), &ticket);
                Ok(ticket)
            }
            TransitionOutcome::Rejected(conflict) => Err(conflict_error(conflict, action)),
        }
    }

    /// Recompute the staff member's served-today totals and fan them out.
    /// Best effort; a failed refresh never fails the completion that
    /// triggered it.
    async fn push_staff_totals(
        stats: Arc<StatsService>,
        bus: Arc<dyn Broadcaster>,
        counter_id: Uuid,
        username: String,
    ) {
        match stats.staff_totals_today(&username).await {
            Ok(totals) => {
                let event = QueueEvent::StatsUpdate { username, totals };
                bus.publish(&Topic::Counter(counter_id), &event);
                bus.publish(&Topic::Global, &event);
            }
            Err(e) => tracing::warn!("Stats refresh for {} failed: {}", username, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::realtime::ChannelBroadcaster;
    use crate::features::tickets::services::DispatchService;
    use crate::features::tickets::store::memory::MemoryTicketStore;
    use crate::features::tickets::store::NewTicket;
    use chrono::FixedOffset;

    struct Fixture {
        store: Arc<MemoryTicketStore>,
        bus: Arc<ChannelBroadcaster>,
        lifecycle: LifecycleService,
        dispatch: DispatchService,
        service_id: Uuid,
        counter_id: Uuid,
    }

    fn setup() -> Fixture {
        let store = Arc::new(MemoryTicketStore::new());
        let bus = Arc::new(ChannelBroadcaster::new(16));
        let stats = Arc::new(StatsService::new(
            store.clone(),
            FixedOffset::east_opt(8 * 3600).unwrap(),
        ));
        let service = store.add_service("PAY", "Payments");
        let counter = store.add_counter(service.id, "C1", "Counter 1");
        Fixture {
            lifecycle: LifecycleService::new(store.clone(), bus.clone(), stats),
            dispatch: DispatchService::new(store.clone(), bus.clone()),
            store,
            bus,
            service_id: service.id,
            counter_id: counter.id,
        }
    }

    async fn issue(fx: &Fixture) -> QueueTicket {
        fx.store
            .insert_ticket(NewTicket {
                ticket_number: 1,
                prefix: "PAY".to_string(),
                service_id: fx.service_id,
                is_prioritized: false,
            })
            .await
            .unwrap()
    }

    async fn call(fx: &Fixture) -> QueueTicket {
        fx.dispatch.call_next(fx.counter_id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn full_happy_path_reaches_served() {
        let fx = setup();
        let service_type = fx
            .store
            .add_service_type(fx.service_id, "BILL", "Bill payment");
        issue(&fx).await;
        let called = call(&fx).await;

        let serving = fx
            .lifecycle
            .serve(called.id, fx.counter_id)
            .await
            .unwrap();
        assert_eq!(serving.status, TicketStatus::Serving);
        assert!(serving.serving_start.is_some());

        let served = fx
            .lifecycle
            .complete(
                called.id,
                fx.counter_id,
                service_type.id,
                Some("paid in cash".to_string()),
                "maria_s",
            )
            .await
            .unwrap();
        assert_eq!(served.status, TicketStatus::Served);
        assert_eq!(served.counter_id, None);
        assert_eq!(served.last_counter_id, Some(fx.counter_id));
        assert_eq!(served.served_by.as_deref(), Some("maria_s"));
        assert!(served.serving_end.is_some());
    }

    #[tokio::test]
    async fn complete_requires_serving() {
        let fx = setup();
        let service_type = fx
            .store
            .add_service_type(fx.service_id, "BILL", "Bill payment");
        issue(&fx).await;
        let called = call(&fx).await;

        let result = fx
            .lifecycle
            .complete(called.id, fx.counter_id, service_type.id, None, "maria_s")
            .await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn complete_rejects_foreign_service_type() {
        let fx = setup();
        let other_service = fx.store.add_service("PRM", "Permits");
        let foreign_type = fx
            .store
            .add_service_type(other_service.id, "BLDG", "Building permit");
        issue(&fx).await;
        let called = call(&fx).await;
        fx.lifecycle.serve(called.id, fx.counter_id).await.unwrap();

        let result = fx
            .lifecycle
            .complete(called.id, fx.counter_id, foreign_type.id, None, "maria_s")
            .await;
        assert!(matches!(result, Err(AppError::ServiceMismatch(_))));
    }

    #[tokio::test]
    async fn serve_from_the_wrong_counter_is_rejected() {
        let fx = setup();
        let other = fx.store.add_counter(fx.service_id, "C2", "Counter 2");
        issue(&fx).await;
        let called = call(&fx).await;

        let result = fx.lifecycle.serve(called.id, other.id).await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn lapsed_ticket_frees_the_counter_and_recalls() {
        let fx = setup();
        issue(&fx).await;
        let called = call(&fx).await;

        let lapsed = fx.lifecycle.lapse(called.id, fx.counter_id).await.unwrap();
        assert_eq!(lapsed.status, TicketStatus::Lapsed);
        assert_eq!(lapsed.counter_id, None);
        assert_eq!(lapsed.last_counter_id, Some(fx.counter_id));

        // The counter is free again for other work.
        assert!(fx.dispatch.current(fx.counter_id).await.unwrap().is_none());

        let recalled = fx
            .lifecycle
            .recall(called.id, fx.counter_id)
            .await
            .unwrap();
        assert_eq!(recalled.status, TicketStatus::Called);
        assert_eq!(recalled.counter_id, Some(fx.counter_id));
    }

    #[tokio::test]
    async fn recall_to_a_foreign_counter_is_rejected() {
        let fx = setup();
        let other_service = fx.store.add_service("PRM", "Permits");
        let foreign = fx.store.add_counter(other_service.id, "P1", "Permits 1");
        issue(&fx).await;
        let called = call(&fx).await;
        fx.lifecycle.lapse(called.id, fx.counter_id).await.unwrap();

        let result = fx.lifecycle.recall(called.id, foreign.id).await;
        assert!(matches!(result, Err(AppError::ServiceMismatch(_))));
    }

    #[tokio::test]
    async fn recall_is_blocked_while_the_counter_is_busy() {
        let fx = setup();
        let first = issue(&fx).await;
        let called = call(&fx).await;
        assert_eq!(first.id, called.id);
        fx.lifecycle.lapse(called.id, fx.counter_id).await.unwrap();

        // Counter picks up another customer before recalling.
        fx.store
            .insert_ticket(NewTicket {
                ticket_number: 2,
                prefix: "PAY".to_string(),
                service_id: fx.service_id,
                is_prioritized: false,
            })
            .await
            .unwrap();
        call(&fx).await;

        let result = fx.lifecycle.recall(first.id, fx.counter_id).await;
        assert!(matches!(result, Err(AppError::CounterBusy(_))));
    }

    #[tokio::test]
    async fn cancel_mid_service_is_terminal() {
        let fx = setup();
        issue(&fx).await;
        let called = call(&fx).await;
        fx.lifecycle.serve(called.id, fx.counter_id).await.unwrap();

        let cancelled = fx
            .lifecycle
            .cancel(
                called.id,
                fx.counter_id,
                Some("left the building".to_string()),
                "maria_s",
            )
            .await
            .unwrap();
        assert_eq!(cancelled.status, TicketStatus::Cancelled);
        assert_eq!(cancelled.counter_id, None);

        // No further moves from a terminal state.
        let result = fx.lifecycle.serve(called.id, fx.counter_id).await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn completion_pushes_refreshed_staff_totals() {
        let fx = setup();
        let service_type = fx
            .store
            .add_service_type(fx.service_id, "BILL", "Bill payment");
        issue(&fx).await;
        let called = call(&fx).await;
        fx.lifecycle.serve(called.id, fx.counter_id).await.unwrap();

        let mut rx = fx.bus.subscribe(&Topic::Counter(fx.counter_id));
        fx.lifecycle
            .complete(called.id, fx.counter_id, service_type.id, None, "maria_s")
            .await
            .unwrap();

        // The refresh runs off the request path; skip past the ticket
        // snapshot and wait for the totals to land.
        let totals = tokio::time::timeout(std::time::Duration::from_secs(1), async {
            loop {
                if let QueueEvent::StatsUpdate { username, totals } = rx.recv().await.unwrap() {
                    assert_eq!(username, "maria_s");
                    return totals;
                }
            }
        })
        .await
        .expect("no totals refresh after completion");
        assert_eq!(totals.tickets_served, 1);
    }

    #[tokio::test]
    async fn concurrent_recalls_admit_one_ticket_per_counter() {
        let fx = setup();
        let first = issue(&fx).await;
        let called = call(&fx).await;
        fx.lifecycle.lapse(called.id, fx.counter_id).await.unwrap();

        let second = fx
            .store
            .insert_ticket(NewTicket {
                ticket_number: 2,
                prefix: "PAY".to_string(),
                service_id: fx.service_id,
                is_prioritized: false,
            })
            .await
            .unwrap();
        let called = call(&fx).await;
        assert_eq!(called.id, second.id);
        fx.lifecycle.lapse(second.id, fx.counter_id).await.unwrap();

        // Both lapsed tickets race for the same idle counter.
        let (a, b) = tokio::join!(
            fx.lifecycle.recall(first.id, fx.counter_id),
            fx.lifecycle.recall(second.id, fx.counter_id),
        );

        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(AppError::CounterBusy(_))));

        let active = fx
            .store
            .active_for_counter(fx.counter_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.status, TicketStatus::Called);
    }
}
