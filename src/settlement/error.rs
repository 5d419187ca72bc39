//! Errors of the settlement engine.
//!
//! Business rejections are not here: they travel as
//! [`OrderOutcome`](super::OrderOutcome) variants.

use super::locks::LockError;
use super::validator::MalformedOrder;
use crate::catalog_actor::ProductError;
use crate::ledger_actor::AccountError;
use crate::model::{AccountId, ProductId};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SettlementError {
    #[error("Malformed order: {0}")]
    Malformed(#[from] MalformedOrder),

    #[error("Goods with ID {0} not found")]
    UnknownProduct(ProductId),

    #[error("Account {0} not found")]
    UnknownAccount(AccountId),

    /// An admin write carried an invalid value (e.g. a zero price).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Could not acquire mutation rights: {0}")]
    LockTimeout(#[from] LockError),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A compensation failed after `cause`; the listed steps were not undone.
    #[error("Rollback incomplete after '{cause}'; not undone: {pending:?}")]
    RollbackIncomplete { cause: String, pending: Vec<String> },
}

impl SettlementError {
    /// Infrastructure failures. Retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SettlementError::LockTimeout(_)
                | SettlementError::StoreUnavailable(_)
                | SettlementError::RollbackIncomplete { .. }
        )
    }

    /// Errors caused by the request itself.
    pub fn is_caller_error(&self) -> bool {
        !self.is_retryable()
    }
}

impl From<ProductError> for SettlementError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => SettlementError::UnknownProduct(id),
            ProductError::ActorCommunicationError(msg) => SettlementError::StoreUnavailable(msg),
            other => SettlementError::InvalidRequest(other.to_string()),
        }
    }
}

impl From<AccountError> for SettlementError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::NotFound(id) => SettlementError::UnknownAccount(id),
            AccountError::ActorCommunicationError(msg) => SettlementError::StoreUnavailable(msg),
            other => SettlementError::InvalidRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::locks::LockKey;
    use std::time::Duration;

    #[test]
    fn infrastructure_failures_are_retryable() {
        let timeout = SettlementError::from(LockError::Timeout {
            key: LockKey::Account(AccountId(1)),
            waited: Duration::from_millis(5),
        });
        assert!(timeout.is_retryable());
        assert!(SettlementError::from(ProductError::ActorCommunicationError("closed".into()))
            .is_retryable());
    }

    #[test]
    fn caller_errors_are_not() {
        assert!(SettlementError::from(MalformedOrder::Empty).is_caller_error());
        assert_eq!(
            SettlementError::from(ProductError::NotFound(ProductId(3))),
            SettlementError::UnknownProduct(ProductId(3))
        );
        assert_eq!(
            SettlementError::from(AccountError::NotFound(AccountId(3))).to_string(),
            "Account account_3 not found"
        );
    }
}
