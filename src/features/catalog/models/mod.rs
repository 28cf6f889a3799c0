mod catalog;

pub use catalog::{Counter, Service, ServiceType};
