pub mod arguments;
pub mod config;
pub mod constants;
pub mod errors; // Structured error handling
pub mod logger;
pub mod metrics;
