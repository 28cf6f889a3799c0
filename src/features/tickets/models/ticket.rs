use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Ticket lifecycle status matching the database enum.
///
/// The transition table below is the single source of truth for legal
/// moves; everything else in the crate goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Called,
    Serving,
    Served,
    Lapsed,
    Returning,
    Cancelled,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 7] = [
        TicketStatus::Pending,
        TicketStatus::Called,
        TicketStatus::Serving,
        TicketStatus::Served,
        TicketStatus::Lapsed,
        TicketStatus::Returning,
        TicketStatus::Cancelled,
    ];

    /// Legal lifecycle moves. Transfer (handled ticket to Returning) is
    /// deliberately not in this table; it goes through `can_transfer_from`
    /// so a plain transition request can never fabricate a transfer.
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Pending, Called)
                | (Called, Serving)
                | (Called, Lapsed)
                | (Lapsed, Called)
                | (Serving, Served)
                | (Serving, Cancelled)
                | (Returning, Called)
        )
    }

    /// Every status the table allows to move into `target`.
    pub fn sources_of(target: TicketStatus) -> Vec<TicketStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| s.can_transition_to(target))
            .collect()
    }

    /// Transfer is allowed while a counter is handling the ticket.
    pub fn can_transfer_from(self) -> bool {
        matches!(self, TicketStatus::Called | TicketStatus::Serving)
    }

    /// States that hold a counter binding.
    pub fn is_active(self) -> bool {
        matches!(self, TicketStatus::Called | TicketStatus::Serving)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Pending => write!(f, "pending"),
            TicketStatus::Called => write!(f, "called"),
            TicketStatus::Serving => write!(f, "serving"),
            TicketStatus::Served => write!(f, "served"),
            TicketStatus::Lapsed => write!(f, "lapsed"),
            TicketStatus::Returning => write!(f, "returning"),
            TicketStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Database model for a queue ticket.
///
/// `counter_id` is the active binding (non-null exactly while called or
/// serving); `last_counter_id` is the audit-only "last handled by" record
/// that survives lapse, completion and transfer.
#[derive(Debug, Clone, FromRow)]
pub struct QueueTicket {
    pub id: Uuid,
    pub ticket_number: i64,
    pub prefix: String,
    pub service_id: Uuid,
    pub service_type_id: Option<Uuid>,
    pub counter_id: Option<Uuid>,
    pub last_counter_id: Option<Uuid>,
    pub status: TicketStatus,
    pub is_prioritized: bool,
    pub created_at: DateTime<Utc>,
    pub serving_start: Option<DateTime<Utc>>,
    pub serving_end: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub served_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl QueueTicket {
    /// Printed/displayed identifier, e.g. "PAY-042". Kept across transfer,
    /// so it is unique per issuing service, not per current service.
    pub fn label(&self) -> String {
        format!("{}-{:03}", self.prefix, self.ticket_number)
    }
}

#[cfg(test)]
mod tests {
    use super::TicketStatus::*;
    use super::*;

    #[test]
    fn legal_transitions() {
        assert!(Pending.can_transition_to(Called));
        assert!(Called.can_transition_to(Serving));
        assert!(Called.can_transition_to(Lapsed));
        assert!(Lapsed.can_transition_to(Called));
        assert!(Serving.can_transition_to(Served));
        assert!(Serving.can_transition_to(Cancelled));
        assert!(Returning.can_transition_to(Called));
    }

    #[test]
    fn terminal_states_have_no_exit() {
        for from in [Served, Cancelled] {
            for to in TicketStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be illegal");
            }
            assert!(!from.can_transfer_from());
        }
    }

    #[test]
    fn sources_mirror_the_table() {
        assert_eq!(TicketStatus::sources_of(Serving), vec![Called]);
        assert_eq!(TicketStatus::sources_of(Served), vec![Serving]);
        assert_eq!(TicketStatus::sources_of(Lapsed), vec![Called]);
        assert_eq!(TicketStatus::sources_of(Cancelled), vec![Serving]);
        assert_eq!(
            TicketStatus::sources_of(Called),
            vec![Pending, Lapsed, Returning]
        );
        assert!(TicketStatus::sources_of(Pending).is_empty());
        assert!(TicketStatus::sources_of(Returning).is_empty());
    }

    #[test]
    fn pending_cannot_skip_to_serving() {
        assert!(!Pending.can_transition_to(Serving));
        assert!(!Pending.can_transition_to(Served));
        assert!(!Pending.can_transition_to(Lapsed));
    }

    #[test]
    fn serving_cannot_regress() {
        assert!(!Serving.can_transition_to(Called));
        assert!(!Serving.can_transition_to(Pending));
        assert!(!Serving.can_transition_to(Lapsed));
    }

    #[test]
    fn transfer_only_while_handled() {
        assert!(Called.can_transfer_from());
        assert!(Serving.can_transfer_from());
        assert!(!Pending.can_transfer_from());
        assert!(!Lapsed.can_transfer_from());
        assert!(!Returning.can_transfer_from());
    }

    #[test]
    fn active_matches_counter_binding_states() {
        for status in TicketStatus::ALL {
            assert_eq!(status.is_active(), matches!(status, Called | Serving));
        }
    }

    #[test]
    fn label_formats_prefix_and_number() {
        let ticket = QueueTicket {
            id: Uuid::new_v4(),
            ticket_number: 42,
            prefix: "PAY".to_string(),
            service_id: Uuid::new_v4(),
            service_type_id: None,
            counter_id: None,
            last_counter_id: None,
            status: Pending,
            is_prioritized: false,
            created_at: Utc::now(),
            serving_start: None,
            serving_end: None,
            remarks: None,
            served_by: None,
            updated_at: Utc::now(),
        };
        assert_eq!(ticket.label(), "PAY-042");
    }
}
