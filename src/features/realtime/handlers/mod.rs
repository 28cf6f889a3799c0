pub mod sse_handler;

pub use sse_handler::*;
