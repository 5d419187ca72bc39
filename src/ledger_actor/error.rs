//! Error types for the ledger actor.

use crate::model::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccountError {
    #[error("Account {0} not found")]
    NotFound(AccountId),

    #[error("Username must not be empty")]
    InvalidUsername,

    /// Debits and credits must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Opening balance must not be negative, got {0}")]
    NegativeOpeningBalance(Decimal),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl AccountError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AccountError::ActorCommunicationError(_))
    }
}
