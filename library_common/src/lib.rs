pub mod http_errors;
pub mod postgres;
pub mod settings;
pub mod telemetry;
