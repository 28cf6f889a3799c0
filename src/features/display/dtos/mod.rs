mod display_dto;

pub use display_dto::*;
