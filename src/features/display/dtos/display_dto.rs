use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::catalog::dtos::CounterResponseDto;
use crate::features::tickets::dtos::TicketResponseDto;

/// One counter on the waiting-room board with whatever it is handling
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CounterBoardDto {
    pub counter: CounterResponseDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<TicketResponseDto>,
}

/// Snapshot a waiting-room display renders for one service. Pull-based;
/// displays refetch it when the event bus hints at a change.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBoardDto {
    pub service_id: Uuid,
    pub service_name: String,
    pub waiting_count: i64,
    pub counters: Vec<CounterBoardDto>,
}
