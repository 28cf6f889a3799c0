mod display_service;

pub use display_service::DisplayService;
