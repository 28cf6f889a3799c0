mod counter_handler;
mod kiosk_handler;
mod ticket_handler;

pub use counter_handler::*;
pub use kiosk_handler::*;
pub use ticket_handler::*;
