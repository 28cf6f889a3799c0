use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Staff profile row. Identity comes from the JWT; this table only adds
/// the local state the token cannot carry, currently the counter the
/// staff member sits at.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub counter_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
