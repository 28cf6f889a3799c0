pub mod auth;
pub mod catalog;
pub mod display;
pub mod realtime;
pub mod stats;
pub mod tickets;
pub mod users;
