mod display_handler;

pub use display_handler::*;
