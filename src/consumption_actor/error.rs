//! Error types for the consumption actor.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConsumptionError {
    /// Settled lines always cost something.
    #[error("Consumption amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Consumption month must be YYYY-MM, got '{0}'")]
    InvalidMonth(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ConsumptionError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ConsumptionError::ActorCommunicationError(_))
    }
}
