use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::tickets::store::ServedTicket;

/// Date range for a report, inclusive on both ends, interpreted in the
/// configured reporting timezone.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// First day of the range (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// Last day of the range (YYYY-MM-DD)
    pub end_date: NaiveDate,
}

/// Served tickets per calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayCountDto {
    pub date: NaiveDate,
    pub count: i64,
}

/// Served tickets per service type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeCountDto {
    pub service_type: String,
    pub count: i64,
}

/// One served ticket in the report detail list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTicketDto {
    pub id: Uuid,
    pub label: String,
    pub is_prioritized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub served_by: Option<String>,
}

impl From<ServedTicket> for ReportTicketDto {
    fn from(t: ServedTicket) -> Self {
        Self {
            id: t.id,
            label: format!("{}-{:03}", t.prefix, t.ticket_number),
            is_prioritized: t.is_prioritized,
            service_type_name: t.service_type_name,
            created_at: t.created_at,
            serving_start: t.serving_start,
            serving_end: t.serving_end,
            remarks: t.remarks,
            served_by: t.served_by,
        }
    }
}

/// Full served-ticket report for a staff member or service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueReportDto {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tickets_served: i64,
    /// Mean of serving_end - serving_start in seconds, over tickets where
    /// both timestamps are present; absent when none are measurable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_service_time_secs: Option<f64>,
    pub service_by_day: Vec<DayCountDto>,
    pub service_types_breakdown: Vec<TypeCountDto>,
    pub ticket_details: Vec<ReportTicketDto>,
    /// True when ticket_details was capped; the aggregates above still
    /// cover the whole range.
    pub truncated: bool,
}

/// Lightweight served-today totals pushed to staff consoles
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffTotals {
    pub tickets_served: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_service_time_secs: Option<f64>,
}
