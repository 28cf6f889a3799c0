//! In-memory store used by tests. The mutex makes every transition a
//! single atomic step, applying exactly the guards the Postgres statement
//! carries.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::catalog::models::{Counter, Service, ServiceType};
use crate::features::tickets::models::{QueueTicket, TicketStatus};
use crate::features::tickets::store::{
    NewTicket, ReportScope, ServedTicket, TicketStore, TransitionConflict, TransitionOutcome,
    TransitionRequest,
};

#[derive(Default)]
struct Inner {
    services: HashMap<Uuid, Service>,
    service_types: HashMap<Uuid, ServiceType>,
    counters: HashMap<Uuid, Counter>,
    tickets: HashMap<Uuid, QueueTicket>,
    sequences: HashMap<Uuid, i64>,
}

#[derive(Default)]
pub struct MemoryTicketStore {
    inner: Mutex<Inner>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_service(&self, code: &str, name: &str) -> Service {
        let service = Service {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .services
            .insert(service.id, service.clone());
        service
    }

    pub fn add_service_type(&self, service_id: Uuid, code: &str, name: &str) -> ServiceType {
        let service_type = ServiceType {
            id: Uuid::new_v4(),
            service_id,
            code: code.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .service_types
            .insert(service_type.id, service_type.clone());
        service_type
    }

    pub fn add_counter(&self, service_id: Uuid, code: &str, name: &str) -> Counter {
        let counter = Counter {
            id: Uuid::new_v4(),
            service_id,
            code: code.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .counters
            .insert(counter.id, counter.clone());
        counter
    }

    /// Shift a ticket's creation time, for deterministic ordering tests.
    pub fn backdate_ticket(&self, id: Uuid, created_at: DateTime<Utc>) {
        if let Some(t) = self.inner.lock().unwrap().tickets.get_mut(&id) {
            t.created_at = created_at;
        }
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn service(&self, id: Uuid) -> Result<Option<Service>> {
        Ok(self.inner.lock().unwrap().services.get(&id).cloned())
    }

    async fn service_type(&self, id: Uuid) -> Result<Option<ServiceType>> {
        Ok(self.inner.lock().unwrap().service_types.get(&id).cloned())
    }

    async fn counter(&self, id: Uuid) -> Result<Option<Counter>> {
        Ok(self.inner.lock().unwrap().counters.get(&id).cloned())
    }

    async fn counters_for_service(&self, service_id: Uuid) -> Result<Vec<Counter>> {
        let inner = self.inner.lock().unwrap();
        let mut counters: Vec<Counter> = inner
            .counters
            .values()
            .filter(|c| c.service_id == service_id)
            .cloned()
            .collect();
        counters.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(counters)
    }

    async fn next_ticket_number(&self, service_id: Uuid) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        let seq = inner.sequences.entry(service_id).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    async fn insert_ticket(&self, new: NewTicket) -> Result<QueueTicket> {
        let ticket = QueueTicket {
            id: Uuid::new_v4(),
            ticket_number: new.ticket_number,
            prefix: new.prefix,
            service_id: new.service_id,
            service_type_id: None,
            counter_id: None,
            last_counter_id: None,
            status: TicketStatus::Pending,
            is_prioritized: new.is_prioritized,
            created_at: Utc::now(),
            serving_start: None,
            serving_end: None,
            remarks: None,
            served_by: None,
            updated_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .tickets
            .insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn ticket(&self, id: Uuid) -> Result<Option<QueueTicket>> {
        Ok(self.inner.lock().unwrap().tickets.get(&id).cloned())
    }

    async fn first_candidate(&self, service_id: Uuid) -> Result<Option<QueueTicket>> {
        let inner = self.inner.lock().unwrap();
        let mut candidates: Vec<&QueueTicket> = inner
            .tickets
            .values()
            .filter(|t| {
                t.service_id == service_id
                    && matches!(t.status, TicketStatus::Pending | TicketStatus::Returning)
            })
            .collect();
        candidates.sort_by_key(|t| (!t.is_prioritized, t.created_at, t.ticket_number));
        Ok(candidates.first().map(|t| (*t).clone()))
    }

    async fn active_for_counter(&self, counter_id: Uuid) -> Result<Option<QueueTicket>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tickets
            .values()
            .find(|t| t.counter_id == Some(counter_id) && t.status.is_active())
            .cloned())
    }

    async fn waiting_count(&self, service_id: Uuid) -> Result<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tickets
            .values()
            .filter(|t| {
                t.service_id == service_id
                    && matches!(t.status, TicketStatus::Pending | TicketStatus::Returning)
            })
            .count() as i64)
    }

    async fn transition(&self, req: TransitionRequest) -> Result<TransitionOutcome> {
        let mut inner = self.inner.lock().unwrap();

        let Some(current) = inner.tickets.get(&req.ticket_id).cloned() else {
            return Ok(TransitionOutcome::Rejected(TransitionConflict::NotFound));
        };

        if !req.expected.contains(&current.status) {
            return Ok(TransitionOutcome::Rejected(TransitionConflict::StateChanged(
                current.status,
            )));
        }

        if req.expected_counter.is_some() && current.counter_id != req.expected_counter {
            return Ok(TransitionOutcome::Rejected(TransitionConflict::StateChanged(
                current.status,
            )));
        }

        if let Some(counter_id) = req.counter_id {
            let occupied = inner.tickets.values().any(|t| {
                t.id != current.id && t.counter_id == Some(counter_id) && t.status.is_active()
            });
            if occupied {
                return Ok(TransitionOutcome::Rejected(
                    TransitionConflict::CounterOccupied,
                ));
            }
        }

        let ticket = inner.tickets.get_mut(&req.ticket_id).unwrap();
        ticket.status = req.to;
        ticket.counter_id = req.counter_id;
        if req.counter_id.is_some() {
            ticket.last_counter_id = req.counter_id;
        }
        if let Some(service_id) = req.service_id {
            ticket.service_id = service_id;
        }
        if let Some(service_type_id) = req.service_type_id {
            ticket.service_type_id = Some(service_type_id);
        }
        if let Some(start) = req.serving_start {
            ticket.serving_start = Some(start);
        }
        if let Some(end) = req.serving_end {
            ticket.serving_end = Some(end);
        }
        if let Some(remarks) = req.remarks {
            ticket.remarks = Some(remarks);
        }
        if let Some(served_by) = req.served_by {
            ticket.served_by = Some(served_by);
        }
        ticket.updated_at = Utc::now();

        Ok(TransitionOutcome::Applied(ticket.clone()))
    }

    async fn served_in_range(
        &self,
        scope: &ReportScope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ServedTicket>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<ServedTicket> = inner
            .tickets
            .values()
            .filter(|t| t.status == TicketStatus::Served)
            .filter(|t| matches!(t.serving_end, Some(end) if end >= from && end < to))
            .filter(|t| match scope {
                ReportScope::User(username) => t.served_by.as_deref() == Some(username),
                ReportScope::Service(service_id) => t.service_id == *service_id,
            })
            .map(|t| ServedTicket {
                id: t.id,
                ticket_number: t.ticket_number,
                prefix: t.prefix.clone(),
                service_id: t.service_id,
                service_type_name: t
                    .service_type_id
                    .and_then(|id| inner.service_types.get(&id))
                    .map(|st| st.name.clone()),
                is_prioritized: t.is_prioritized,
                created_at: t.created_at,
                serving_start: t.serving_start,
                serving_end: t.serving_end,
                remarks: t.remarks.clone(),
                served_by: t.served_by.clone(),
            })
            .collect();
        rows.sort_by(|a, b| b.serving_end.cmp(&a.serving_end));
        Ok(rows)
    }
}
