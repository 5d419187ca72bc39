//! Startup, shutdown, configuration and logging.

pub mod config;
pub mod settlement_system;
pub mod tracing;

pub use config::{ConfigError, EngineConfig};
pub use settlement_system::SettlementSystem;
pub use self::tracing::setup_tracing;
