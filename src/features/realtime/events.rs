use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::stats::dtos::StaffTotals;
use crate::features::tickets::dtos::TicketResponseDto;

/// Subscriber scopes of the fan-out bus. Every lifecycle event goes to
/// the owning counter, the ticket's service/display channel, and the
/// global channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    Global,
    Service(Uuid),
    Counter(Uuid),
}

impl Topic {
    pub fn key(&self) -> String {
        match self {
            Topic::Global => "global".to_string(),
            Topic::Service(id) => format!("service:{}", id),
            Topic::Counter(id) => format!("counter:{}", id),
        }
    }
}

/// Events delivered at-least-once to subscribers. A delivered event is a
/// hint to refetch/merge, never the sole truth; subscribers must tolerate
/// duplicates and drops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum QueueEvent {
    /// A ticket changed state; carries the full DTO snapshot.
    #[serde(rename = "ticket:update")]
    TicketUpdate { ticket: TicketResponseDto },

    /// Refreshed served-today totals for a staff member.
    #[serde(rename = "stats:update")]
    StatsUpdate {
        username: String,
        totals: StaffTotals,
    },

    /// Audible alert at a counter; carries no state, best-effort only.
    #[serde(rename = "ring:bell")]
    RingBell { counter_id: Uuid },
}

impl QueueEvent {
    /// SSE event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            QueueEvent::TicketUpdate { .. } => "ticket:update",
            QueueEvent::StatsUpdate { .. } => "stats:update",
            QueueEvent::RingBell { .. } => "ring:bell",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_keys_are_scoped() {
        let id = Uuid::new_v4();
        assert_eq!(Topic::Global.key(), "global");
        assert_eq!(Topic::Service(id).key(), format!("service:{}", id));
        assert_eq!(Topic::Counter(id).key(), format!("counter:{}", id));
    }

    #[test]
    fn ring_bell_serializes_with_event_tag() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(QueueEvent::RingBell { counter_id: id }).unwrap();
        assert_eq!(json["event"], "ring:bell");
        assert_eq!(json["data"]["counter_id"], id.to_string());
    }
}
