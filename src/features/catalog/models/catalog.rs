use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A service the office offers (e.g. Payment, Customer Welfare). Every
/// counter and ticket is scoped to exactly one service; the code doubles
/// as the ticket prefix.
#[derive(Debug, Clone, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sub-classification of a service, picked when a ticket is completed.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceType {
    pub id: Uuid,
    pub service_id: Uuid,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A staffed service point, bound to exactly one service, serving at most
/// one active ticket at a time.
#[derive(Debug, Clone, FromRow)]
pub struct Counter {
    pub id: Uuid,
    pub service_id: Uuid,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
