//! HTTP service that accepts device temperature readings, flags overtemp
//! devices and keeps the payloads it could not parse for later inspection.

pub mod config;
pub mod error_log;
pub mod payload;
pub mod routes;
pub mod serializable_objects;
pub mod server_error;
pub mod threshold;
