//! Outcomes, receipts and the status codes callers see.

use super::error::SettlementError;
use super::validator::{MalformedOrder, PricedLine};
use crate::model::{AccountId, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Display;

pub const SETTLED: u8 = 0;
pub const INSUFFICIENT_STOCK: u8 = 1;
pub const INSUFFICIENT_BALANCE: u8 = 2;

/// What a committed settlement did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReceipt {
    pub attempt: u64,
    pub account_id: AccountId,
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
    pub remaining_balance: Decimal,
    pub settled_at: DateTime<Utc>,
}

impl SettlementReceipt {
    /// Calendar month of the settlement, `YYYY-MM`.
    pub fn month(&self) -> String {
        self.settled_at.format("%Y-%m").to_string()
    }
}

/// Business result of one attempt. Errors travel separately as
/// [`SettlementError`].
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    Settled(SettlementReceipt),
    RejectedInsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
    RejectedInsufficientBalance {
        required: Decimal,
        available: Decimal,
    },
}

impl OrderOutcome {
    pub fn code(&self) -> u8 {
        match self {
            OrderOutcome::Settled(_) => SETTLED,
            OrderOutcome::RejectedInsufficientStock { .. } => INSUFFICIENT_STOCK,
            OrderOutcome::RejectedInsufficientBalance { .. } => INSUFFICIENT_BALANCE,
        }
    }

    pub fn receipt(&self) -> Option<&SettlementReceipt> {
        match self {
            OrderOutcome::Settled(receipt) => Some(receipt),
            _ => None,
        }
    }
}

/// Terminal and intermediate states of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementPhase {
    Pending,
    Validating,
    Committed,
    RejectedInsufficientStock,
    RejectedInsufficientBalance,
    RejectedMalformed,
    Failed,
}

impl SettlementPhase {
    /// The terminal phase a finished attempt ended in.
    pub fn of(result: &Result<OrderOutcome, SettlementError>) -> Self {
        match result {
            Ok(OrderOutcome::Settled(_)) => SettlementPhase::Committed,
            Ok(OrderOutcome::RejectedInsufficientStock { .. }) => {
                SettlementPhase::RejectedInsufficientStock
            }
            Ok(OrderOutcome::RejectedInsufficientBalance { .. }) => {
                SettlementPhase::RejectedInsufficientBalance
            }
            Err(SettlementError::Malformed(_)) => SettlementPhase::RejectedMalformed,
            Err(_) => SettlementPhase::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SettlementPhase::Pending | SettlementPhase::Validating)
    }
}

impl Display for SettlementPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SettlementPhase::Pending => "pending",
            SettlementPhase::Validating => "validating",
            SettlementPhase::Committed => "committed",
            SettlementPhase::RejectedInsufficientStock => "rejected_insufficient_stock",
            SettlementPhase::RejectedInsufficientBalance => "rejected_insufficient_balance",
            SettlementPhase::RejectedMalformed => "rejected_malformed",
            SettlementPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Reduces a settlement result to what the caller sees: a status code, or the
/// error with its message.
pub fn report(result: Result<OrderOutcome, SettlementError>) -> Result<u8, SettlementError> {
    result.map(|outcome| outcome.code())
}

/// Parses a cart payload (`[{ "product_id": 1, "quantity": 2 }, ...]`).
pub fn parse_items(payload: &str) -> Result<Vec<crate::model::LineItem>, MalformedOrder> {
    serde_json::from_str(payload).map_err(|e| MalformedOrder::Unparseable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn codes_are_fixed() {
        let stock = OrderOutcome::RejectedInsufficientStock {
            product_id: ProductId(1),
            requested: 2,
            available: 1,
        };
        let balance = OrderOutcome::RejectedInsufficientBalance {
            required: dec!(2),
            available: dec!(1),
        };
        assert_eq!(report(Ok(stock)), Ok(1));
        assert_eq!(report(Ok(balance)), Ok(2));
        assert_eq!(
            report(Err(MalformedOrder::Empty.into())),
            Err(SettlementError::Malformed(MalformedOrder::Empty))
        );
    }

    #[test]
    fn phases_of_results() {
        assert_eq!(
            SettlementPhase::of(&Err(MalformedOrder::Empty.into())),
            SettlementPhase::RejectedMalformed
        );
        assert_eq!(
            SettlementPhase::of(&Err(SettlementError::StoreUnavailable("gone".into()))),
            SettlementPhase::Failed
        );
        assert!(SettlementPhase::Failed.is_terminal());
        assert!(!SettlementPhase::Validating.is_terminal());
        assert_eq!(SettlementPhase::Committed.to_string(), "committed");
    }

    #[test]
    fn receipt_month() {
        let receipt = SettlementReceipt {
            attempt: 1,
            account_id: AccountId(1),
            lines: Vec::new(),
            total: dec!(0),
            remaining_balance: dec!(0),
            settled_at: "2026-03-31T23:59:59Z".parse().unwrap(),
        };
        assert_eq!(receipt.month(), "2026-03");
    }

    #[test]
    fn cart_payload_parses_or_is_malformed() {
        let items = parse_items(r#"[{"product_id": 2, "quantity": 3}]"#).unwrap();
        assert_eq!(items[0].quantity, 3);
        assert!(matches!(
            parse_items("[{\"product_id\": 2}]"),
            Err(MalformedOrder::Unparseable(_))
        ));
    }
}
