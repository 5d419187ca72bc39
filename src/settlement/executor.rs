//! Applying an affordable order.
//!
//! The caller holds exclusive rights on every row involved. Decrements go out
//! in ascending product order, then the debit. Each applied mutation is pushed
//! onto an [`UndoLog`]; if any later step is refused or fails, the log is
//! replayed in reverse before the caller releases its rights.

use super::error::SettlementError;
use super::outcome::OrderOutcome;
use super::validator::PricedLine;
use crate::catalog_actor::StockChange;
use crate::clients::{CatalogClient, LedgerClient};
use crate::ledger_actor::BalanceChange;
use crate::model::{AccountId, ProductId};
use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};

/// A mutation that has landed and can be compensated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Decrement { product_id: ProductId, quantity: u32 },
    Debit { account_id: AccountId, amount: Decimal },
}

#[derive(Debug, Default)]
pub struct UndoLog {
    applied: Vec<Applied>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: Applied) {
        self.applied.push(step);
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    /// Compensates every recorded step, newest first. Returns the steps that
    /// could not be compensated; empty means state is back where it started.
    #[instrument(skip_all)]
    pub async fn rollback(self, catalog: &CatalogClient, ledger: &LedgerClient) -> Vec<Applied> {
        warn!(steps = self.applied.len(), "Rolling back");
        let mut pending = Vec::new();
        for step in self.applied.into_iter().rev() {
            let undone = match step {
                Applied::Decrement {
                    product_id,
                    quantity,
                } => catalog
                    .restock(product_id, quantity)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string()),
                Applied::Debit { account_id, amount } => ledger
                    .credit(account_id, amount)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string()),
            };
            match undone {
                Ok(()) => info!(?step, "Compensated"),
                Err(e) => {
                    error!(?step, error = %e, "Compensation failed");
                    pending.push(step);
                }
            }
        }
        pending
    }
}

/// Result of [`execute`] before the receipt is stamped.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    Committed { remaining_balance: Decimal },
    Refused(OrderOutcome),
}

/// Applies `lines` and the debit of `total`, or leaves every row as it was.
#[instrument(skip(catalog, ledger, lines), fields(lines = lines.len()))]
pub async fn execute(
    catalog: &CatalogClient,
    ledger: &LedgerClient,
    account_id: AccountId,
    lines: &[PricedLine],
    total: Decimal,
) -> Result<Execution, SettlementError> {
    let mut undo = UndoLog::new();

    for line in lines {
        match catalog
            .try_decrement(line.product_id, line.quantity, line.stock)
            .await
        {
            Ok(StockChange::Applied { remaining }) => {
                info!(product_id = %line.product_id, remaining, "Stock decremented");
                undo.record(Applied::Decrement {
                    product_id: line.product_id,
                    quantity: line.quantity,
                });
            }
            Ok(StockChange::Insufficient { available }) => {
                warn!(product_id = %line.product_id, available, "Stock moved under us");
                let refused = OrderOutcome::RejectedInsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available,
                };
                return abort(undo, catalog, ledger, Ok(Execution::Refused(refused))).await;
            }
            Err(e) => return abort(undo, catalog, ledger, Err(e.into())).await,
        }
    }

    match ledger.try_debit(account_id, total).await {
        Ok(BalanceChange::Applied { remaining }) => {
            info!(%account_id, %remaining, "Balance debited");
            Ok(Execution::Committed {
                remaining_balance: remaining,
            })
        }
        Ok(BalanceChange::Insufficient { available }) => {
            warn!(%account_id, %available, "Balance moved under us");
            let refused = OrderOutcome::RejectedInsufficientBalance {
                required: total,
                available,
            };
            abort(undo, catalog, ledger, Ok(Execution::Refused(refused))).await
        }
        Err(e) => abort(undo, catalog, ledger, Err(e.into())).await,
    }
}

/// Rolls back and passes `result` through, unless a compensation failed.
async fn abort(
    undo: UndoLog,
    catalog: &CatalogClient,
    ledger: &LedgerClient,
    result: Result<Execution, SettlementError>,
) -> Result<Execution, SettlementError> {
    if undo.is_empty() {
        return result;
    }
    let pending = undo.rollback(catalog, ledger).await;
    if pending.is_empty() {
        return result;
    }
    let cause = match &result {
        Ok(Execution::Refused(outcome)) => format!("refusal with code {}", outcome.code()),
        Ok(Execution::Committed { .. }) => "commit".to_string(),
        Err(e) => e.to_string(),
    };
    Err(SettlementError::RollbackIncomplete {
        cause,
        pending: pending.iter().map(|step| format!("{step:?}")).collect(),
    })
}
