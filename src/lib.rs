pub mod auth;
pub mod configuration;
pub mod error;
pub mod store;
pub mod telemetry;
