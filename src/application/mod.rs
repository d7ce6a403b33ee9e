//! Application layer - use cases, ports and API data transfer objects

pub mod dto;
pub mod ports;
pub mod services;
