use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::tickets::models::{QueueTicket, TicketStatus};

/// Kiosk request for a new ticket
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketDto {
    pub service_id: Uuid,
    /// Priority lane (senior citizens, PWD, pregnant customers)
    #[serde(default)]
    pub is_prioritized: bool,
}

/// Start serving the ticket currently called to a counter
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServeTicketDto {
    pub counter_id: Uuid,
}

/// Finish serving and record the outcome
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTicketDto {
    pub counter_id: Uuid,
    /// What the visit turned out to be about; must belong to the
    /// ticket's current service.
    pub service_type_id: Uuid,
    #[validate(length(max = 1000, message = "Remarks must be at most 1000 characters"))]
    pub remarks: Option<String>,
}

/// Mark a called ticket as no-show
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LapseTicketDto {
    pub counter_id: Uuid,
}

/// Cancel a ticket mid-service
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelTicketDto {
    pub counter_id: Uuid,
    #[validate(length(max = 1000, message = "Remarks must be at most 1000 characters"))]
    pub remarks: Option<String>,
}

/// Call a specific lapsed ticket back to a counter
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecallTicketDto {
    pub counter_id: Uuid,
}

/// Move a ticket to another service's queue
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferTicketDto {
    pub counter_id: Uuid,
    /// Destination service; must differ from the ticket's current service.
    pub service_id: Uuid,
}

/// A queue ticket as seen by consoles, displays and the event bus
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponseDto {
    pub id: Uuid,
    pub ticket_number: i64,
    pub prefix: String,
    /// Display label, e.g. "PAY-042"
    pub label: String,
    pub service_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_counter_id: Option<Uuid>,
    pub status: TicketStatus,
    pub is_prioritized: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub served_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<QueueTicket> for TicketResponseDto {
    fn from(t: QueueTicket) -> Self {
        let label = t.label();
        Self {
            id: t.id,
            ticket_number: t.ticket_number,
            prefix: t.prefix,
            label,
            service_id: t.service_id,
            service_type_id: t.service_type_id,
            counter_id: t.counter_id,
            last_counter_id: t.last_counter_id,
            status: t.status,
            is_prioritized: t.is_prioritized,
            created_at: t.created_at,
            serving_start: t.serving_start,
            serving_end: t.serving_end,
            remarks: t.remarks,
            served_by: t.served_by,
            updated_at: t.updated_at,
        }
    }
}
