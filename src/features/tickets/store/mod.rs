mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgTicketStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::catalog::models::{Counter, Service, ServiceType};
use crate::features::tickets::models::{QueueTicket, TicketStatus};

/// Fields of a freshly issued ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub ticket_number: i64,
    pub prefix: String,
    pub service_id: Uuid,
    pub is_prioritized: bool,
}

/// One conditional state change.
///
/// The store must apply this as a single atomic write that succeeds only
/// if the persisted status is still in `expected`, the active counter
/// binding still equals `expected_counter` (when given), and, for
/// counter-binding transitions, the target counter holds no other
/// called/serving ticket. There is deliberately no separate
/// check-then-act path.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub ticket_id: Uuid,
    pub expected: Vec<TicketStatus>,
    pub to: TicketStatus,
    /// Guard: the counter currently bound to the ticket, for operations
    /// issued from a specific counter.
    pub expected_counter: Option<Uuid>,
    /// New active binding; `None` clears it.
    pub counter_id: Option<Uuid>,
    /// Transfer destination; `None` keeps the current service.
    pub service_id: Option<Uuid>,
    pub service_type_id: Option<Uuid>,
    pub serving_start: Option<DateTime<Utc>>,
    pub serving_end: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub served_by: Option<String>,
}

impl TransitionRequest {
    /// A lifecycle move. Expected states the transition table does not
    /// allow into `to` are dropped up front, so no request can carry a
    /// move the table forbids.
    pub fn new(ticket_id: Uuid, expected: Vec<TicketStatus>, to: TicketStatus) -> Self {
        let expected = expected
            .into_iter()
            .filter(|s| s.can_transition_to(to))
            .collect();
        Self::raw(ticket_id, expected, to)
    }

    /// A transfer: the one move outside the lifecycle table. The ticket
    /// leaves the counter handling it and re-enters a queue as returning.
    pub fn transfer(ticket_id: Uuid) -> Self {
        let expected = TicketStatus::ALL
            .into_iter()
            .filter(|s| s.can_transfer_from())
            .collect();
        Self::raw(ticket_id, expected, TicketStatus::Returning)
    }

    fn raw(ticket_id: Uuid, expected: Vec<TicketStatus>, to: TicketStatus) -> Self {
        Self {
            ticket_id,
            expected,
            to,
            expected_counter: None,
            counter_id: None,
            service_id: None,
            service_type_id: None,
            serving_start: None,
            serving_end: None,
            remarks: None,
            served_by: None,
        }
    }
}

/// Why a conditional transition did not apply. Classification is advisory
/// (the caller may be racing); the guarantee is that nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionConflict {
    NotFound,
    /// Persisted state no longer matches `expected` / `expected_counter`.
    StateChanged(TicketStatus),
    /// The target counter already holds a called/serving ticket.
    CounterOccupied,
}

#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Applied(QueueTicket),
    Rejected(TransitionConflict),
}

/// Report selection scope.
#[derive(Debug, Clone)]
pub enum ReportScope {
    /// Tickets completed by this staff member (`served_by` username).
    User(String),
    /// Tickets completed under this service.
    Service(Uuid),
}

/// A served ticket joined with its service type name, as consumed by the
/// statistics aggregator.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServedTicket {
    pub id: Uuid,
    pub ticket_number: i64,
    pub prefix: String,
    pub service_id: Uuid,
    pub service_type_name: Option<String>,
    pub is_prioritized: bool,
    pub created_at: DateTime<Utc>,
    pub serving_start: Option<DateTime<Utc>>,
    pub serving_end: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub served_by: Option<String>,
}

/// Record store behind the queue core: catalog lookups, ticket CRUD, the
/// per-service sequence, and the conditional-update primitive every state
/// change rides on. Production uses Postgres; tests use an in-memory map
/// with identical guard semantics.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn service(&self, id: Uuid) -> Result<Option<Service>>;
    async fn service_type(&self, id: Uuid) -> Result<Option<ServiceType>>;
    async fn counter(&self, id: Uuid) -> Result<Option<Counter>>;
    async fn counters_for_service(&self, service_id: Uuid) -> Result<Vec<Counter>>;

    /// Advance and return the issuing sequence for a service.
    async fn next_ticket_number(&self, service_id: Uuid) -> Result<i64>;

    async fn insert_ticket(&self, new: NewTicket) -> Result<QueueTicket>;

    async fn ticket(&self, id: Uuid) -> Result<Option<QueueTicket>>;

    /// Oldest dispatchable ticket of a service: pending or returning,
    /// prioritized first, then created_at, then ticket_number.
    async fn first_candidate(&self, service_id: Uuid) -> Result<Option<QueueTicket>>;

    /// The called/serving ticket currently bound to a counter, if any.
    async fn active_for_counter(&self, counter_id: Uuid) -> Result<Option<QueueTicket>>;

    /// Number of tickets a service's displays show as waiting.
    async fn waiting_count(&self, service_id: Uuid) -> Result<i64>;

    /// Apply one conditional state change; see [`TransitionRequest`].
    async fn transition(&self, req: TransitionRequest) -> Result<TransitionOutcome>;

    /// Served tickets for a scope with `serving_end` in `[from, to)`,
    /// newest first.
    async fn served_in_range(
        &self,
        scope: &ReportScope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ServedTicket>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_drops_moves_the_table_forbids() {
        let req = TransitionRequest::new(
            Uuid::new_v4(),
            vec![TicketStatus::Pending, TicketStatus::Served],
            TicketStatus::Called,
        );
        assert_eq!(req.expected, vec![TicketStatus::Pending]);
    }

    #[test]
    fn transfer_leaves_from_handled_states_only() {
        let req = TransitionRequest::transfer(Uuid::new_v4());
        assert_eq!(
            req.expected,
            vec![TicketStatus::Called, TicketStatus::Serving]
        );
        assert_eq!(req.to, TicketStatus::Returning);
    }
}
