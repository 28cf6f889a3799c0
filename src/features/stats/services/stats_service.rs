use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::core::error::{AppError, Result};
use crate::features::stats::dtos::{
    DayCountDto, QueueReportDto, ReportTicketDto, StaffTotals, TypeCountDto,
};
use crate::features::tickets::store::{ReportScope, ServedTicket, TicketStore};
use crate::shared::constants::{REPORT_DETAILS_CAP, REPORT_MAX_RANGE_DAYS};

/// Read-side aggregation over served tickets. Idempotent and safe under
/// concurrent mutation; reports never feed back into dispatch, so the
/// store's default read consistency is enough.
pub struct StatsService {
    store: Arc<dyn TicketStore>,
    /// Fixed reporting timezone for day grouping and range boundaries.
    utc_offset: FixedOffset,
}

impl StatsService {
    pub fn new(store: Arc<dyn TicketStore>, utc_offset: FixedOffset) -> Self {
        Self { store, utc_offset }
    }

    /// Served-ticket report for a scope over an inclusive date range.
    pub async fn report(
        &self,
        scope: ReportScope,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<QueueReportDto> {
        if end_date < start_date {
            return Err(AppError::Validation(
                "endDate must not be before startDate".to_string(),
            ));
        }
        if (end_date - start_date).num_days() >= REPORT_MAX_RANGE_DAYS {
            return Err(AppError::Validation(format!(
                "Report range is limited to {} days",
                REPORT_MAX_RANGE_DAYS
            )));
        }

        let from = self.day_start_utc(start_date)?;
        let to = self.day_start_utc(
            end_date
                .checked_add_days(Days::new(1))
                .ok_or_else(|| AppError::Validation("endDate out of range".to_string()))?,
        )?;

        let rows = self.store.served_in_range(&scope, from, to).await?;
        Ok(assemble_report(rows, start_date, end_date, self.utc_offset))
    }

    /// Served-today totals for one staff member, pushed over the fan-out
    /// bus after each completion.
    pub async fn staff_totals_today(&self, username: &str) -> Result<StaffTotals> {
        let today = Utc::now().with_timezone(&self.utc_offset).date_naive();
        let report = self
            .report(ReportScope::User(username.to_string()), today, today)
            .await?;

        Ok(StaffTotals {
            tickets_served: report.tickets_served,
            average_service_time_secs: report.average_service_time_secs,
        })
    }

    /// Midnight of a reporting-timezone day as a UTC instant.
    fn day_start_utc(&self, date: NaiveDate) -> Result<DateTime<Utc>> {
        Ok((date.and_time(NaiveTime::MIN) - self.utc_offset).and_utc())
    }
}

/// Pure aggregation over an already-fetched snapshot; the rows arrive
/// sorted by serving_end descending.
fn assemble_report(
    rows: Vec<ServedTicket>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    utc_offset: FixedOffset,
) -> QueueReportDto {
    let tickets_served = rows.len() as i64;

    // Mean duration in seconds over tickets with both timestamps; tickets
    // missing serving_start still count toward the total.
    let durations: Vec<f64> = rows
        .iter()
        .filter_map(|t| match (t.serving_start, t.serving_end) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        })
        .collect();
    let average_service_time_secs = if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<f64>() / durations.len() as f64)
    };

    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    let mut by_type: BTreeMap<String, i64> = BTreeMap::new();
    for row in &rows {
        if let Some(end) = row.serving_end {
            *by_day
                .entry(end.with_timezone(&utc_offset).date_naive())
                .or_insert(0) += 1;
        }
        let type_name = row
            .service_type_name
            .clone()
            .unwrap_or_else(|| "Unspecified".to_string());
        *by_type.entry(type_name).or_insert(0) += 1;
    }

    let truncated = rows.len() > REPORT_DETAILS_CAP;
    let ticket_details: Vec<ReportTicketDto> = rows
        .into_iter()
        .take(REPORT_DETAILS_CAP)
        .map(|t| t.into())
        .collect();

    QueueReportDto {
        start_date,
        end_date,
        tickets_served,
        average_service_time_secs,
        service_by_day: by_day
            .into_iter()
            .map(|(date, count)| DayCountDto { date, count })
            .collect(),
        service_types_breakdown: by_type
            .into_iter()
            .map(|(service_type, count)| TypeCountDto {
                service_type,
                count,
            })
            .collect(),
        ticket_details,
        truncated,
    }
}
