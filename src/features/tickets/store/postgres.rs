use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::catalog::models::{Counter, Service, ServiceType};
use crate::features::tickets::models::{QueueTicket, TicketStatus};
use crate::features::tickets::store::{
    NewTicket, ReportScope, ServedTicket, TicketStore, TransitionConflict, TransitionOutcome,
    TransitionRequest,
};

const TICKET_COLUMNS: &str = "id, ticket_number, prefix, service_id, service_type_id, \
     counter_id, last_counter_id, status, is_prioritized, created_at, \
     serving_start, serving_end, remarks, served_by, updated_at";

/// Postgres-backed store. Every state change is one `UPDATE … WHERE …`
/// carrying the status, counter-binding and counter-occupancy guards, so
/// the row either moves exactly as requested or not at all. The partial
/// unique index on active counter bindings enforces single occupancy
/// against writes the statement's snapshot cannot see.
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |e| {
            tracing::error!("{}: {:?}", context, e);
            AppError::Database(e)
        }
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn service(&self, id: Uuid) -> Result<Option<Service>> {
        sqlx::query_as::<_, Service>(
            "SELECT id, code, name, created_at, updated_at FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err("Failed to fetch service"))
    }

    async fn service_type(&self, id: Uuid) -> Result<Option<ServiceType>> {
        sqlx::query_as::<_, ServiceType>(
            "SELECT id, service_id, code, name, created_at, updated_at \
             FROM service_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err("Failed to fetch service type"))
    }

    async fn counter(&self, id: Uuid) -> Result<Option<Counter>> {
        sqlx::query_as::<_, Counter>(
            "SELECT id, service_id, code, name, created_at, updated_at \
             FROM counters WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err("Failed to fetch counter"))
    }

    async fn counters_for_service(&self, service_id: Uuid) -> Result<Vec<Counter>> {
        sqlx::query_as::<_, Counter>(
            "SELECT id, service_id, code, name, created_at, updated_at \
             FROM counters WHERE service_id = $1 ORDER BY code",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::db_err("Failed to list counters"))
    }

    async fn next_ticket_number(&self, service_id: Uuid) -> Result<i64> {
        // Single upsert keeps the sequence race-free under concurrent kiosks.
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO ticket_sequences (service_id, next_number)
            VALUES ($1, 1)
            ON CONFLICT (service_id)
            DO UPDATE SET next_number = ticket_sequences.next_number + 1
            RETURNING next_number
            "#,
        )
        .bind(service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::db_err("Failed to advance ticket sequence"))
    }

    async fn insert_ticket(&self, new: NewTicket) -> Result<QueueTicket> {
        sqlx::query_as::<_, QueueTicket>(&format!(
            r#"
            INSERT INTO queue_tickets (ticket_number, prefix, service_id, is_prioritized)
            VALUES ($1, $2, $3, $4)
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(new.ticket_number)
        .bind(&new.prefix)
        .bind(new.service_id)
        .bind(new.is_prioritized)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::db_err("Failed to insert ticket"))
    }

    async fn ticket(&self, id: Uuid) -> Result<Option<QueueTicket>> {
        sqlx::query_as::<_, QueueTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM queue_tickets WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err("Failed to fetch ticket"))
    }

    async fn first_candidate(&self, service_id: Uuid) -> Result<Option<QueueTicket>> {
        sqlx::query_as::<_, QueueTicket>(&format!(
            r#"
            SELECT {TICKET_COLUMNS}
            FROM queue_tickets
            WHERE service_id = $1 AND status IN ('pending', 'returning')
            ORDER BY is_prioritized DESC, created_at ASC, ticket_number ASC
            LIMIT 1
            "#,
        ))
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err("Failed to select dispatch candidate"))
    }

    async fn active_for_counter(&self, counter_id: Uuid) -> Result<Option<QueueTicket>> {
        sqlx::query_as::<_, QueueTicket>(&format!(
            r#"
            SELECT {TICKET_COLUMNS}
            FROM queue_tickets
            WHERE counter_id = $1 AND status IN ('called', 'serving')
            LIMIT 1
            "#,
        ))
        .bind(counter_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_err("Failed to fetch active ticket for counter"))
    }

    async fn waiting_count(&self, service_id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM queue_tickets \
             WHERE service_id = $1 AND status IN ('pending', 'returning')",
        )
        .bind(service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::db_err("Failed to count waiting tickets"))
    }

    async fn transition(&self, req: TransitionRequest) -> Result<TransitionOutcome> {
        let expected: Vec<String> = req.expected.iter().map(|s| s.to_string()).collect();

        let result = sqlx::query_as::<_, QueueTicket>(&format!(
            r#"
            UPDATE queue_tickets t SET
                status = $2,
                counter_id = $3,
                last_counter_id = COALESCE($3, t.last_counter_id),
                service_id = COALESCE($4, t.service_id),
                service_type_id = COALESCE($5, t.service_type_id),
                serving_start = COALESCE($6, t.serving_start),
                serving_end = COALESCE($7, t.serving_end),
                remarks = COALESCE($8, t.remarks),
                served_by = COALESCE($9, t.served_by),
                updated_at = now()
            WHERE t.id = $1
              AND t.status::text = ANY($10)
              AND ($11::uuid IS NULL OR t.counter_id = $11)
              AND ($3::uuid IS NULL OR NOT EXISTS (
                    SELECT 1 FROM queue_tickets o
                    WHERE o.counter_id = $3
                      AND o.status IN ('called', 'serving')
                      AND o.id <> t.id))
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(req.ticket_id)
        .bind(req.to)
        .bind(req.counter_id)
        .bind(req.service_id)
        .bind(req.service_type_id)
        .bind(req.serving_start)
        .bind(req.serving_end)
        .bind(req.remarks.as_deref())
        .bind(req.served_by.as_deref())
        .bind(&expected)
        .bind(req.expected_counter)
        .fetch_optional(&self.pool)
        .await;

        let updated = match result {
            Ok(row) => row,
            // Two in-flight transitions can bind different rows to the
            // same counter without either statement seeing the other's
            // uncommitted write. The unique index on active counter
            // bindings turns that race into a violation here.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Ok(TransitionOutcome::Rejected(
                    TransitionConflict::CounterOccupied,
                ));
            }
            Err(e) => return Err(Self::db_err("Failed to apply ticket transition")(e)),
        };

        if let Some(ticket) = updated {
            return Ok(TransitionOutcome::Applied(ticket));
        }

        // Nothing was written; classify the refusal for the caller. The
        // refetch may itself race, which is fine - classification is a
        // hint, the guard above is the guarantee.
        let current = self.ticket(req.ticket_id).await?;
        let conflict = match current {
            None => TransitionConflict::NotFound,
            Some(t) if !req.expected.contains(&t.status) => {
                TransitionConflict::StateChanged(t.status)
            }
            Some(t) if req.expected_counter.is_some() && t.counter_id != req.expected_counter => {
                TransitionConflict::StateChanged(t.status)
            }
            Some(_) => TransitionConflict::CounterOccupied,
        };
        Ok(TransitionOutcome::Rejected(conflict))
    }

    async fn served_in_range(
        &self,
        scope: &ReportScope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ServedTicket>> {
        let base = r#"
            SELECT t.id, t.ticket_number, t.prefix, t.service_id,
                   st.name AS service_type_name, t.is_prioritized, t.created_at,
                   t.serving_start, t.serving_end, t.remarks, t.served_by
            FROM queue_tickets t
            LEFT JOIN service_types st ON st.id = t.service_type_id
            WHERE t.status = 'served'
              AND t.serving_end >= $1 AND t.serving_end < $2
        "#;

        let rows = match scope {
            ReportScope::User(username) => {
                sqlx::query_as::<_, ServedTicket>(&format!(
                    "{base} AND t.served_by = $3 ORDER BY t.serving_end DESC"
                ))
                .bind(from)
                .bind(to)
                .bind(username)
                .fetch_all(&self.pool)
                .await
            }
            ReportScope::Service(service_id) => {
                sqlx::query_as::<_, ServedTicket>(&format!(
                    "{base} AND t.service_id = $3 ORDER BY t.serving_end DESC"
                ))
                .bind(from)
                .bind(to)
                .bind(service_id)
                .fetch_all(&self.pool)
                .await
            }
        };

        rows.map_err(Self::db_err("Failed to scan served tickets"))
    }
}
