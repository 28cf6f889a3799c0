mod ticket;

pub use ticket::{QueueTicket, TicketStatus};
