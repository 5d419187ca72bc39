//! The settlement engine: validation, execution and reporting behind one
//! handle.
//!
//! # Flow of one attempt
//!
//! 1. Shape check (no storage access).
//! 2. Advisory snapshot under shared rights on every involved row. A stock or
//!    balance shortfall is reported here without taking exclusive rights.
//! 3. Exclusive rights on the same rows, in global order.
//! 4. Re-read and re-assess. This second assessment is the authority.
//! 5. [`execute`]: decrements, then the debit, rolling back on any refusal or
//!    failure.
//! 6. Rights released, consumption recorded.
//!
//! Admin writes (price/stock edits, recharges) take the exclusive right of
//! their row and consistent reads (including catalog listings) take the shared
//! right, so neither can observe or interleave with a half-applied settlement.

use super::error::SettlementError;
use super::executor::{execute, Execution};
use super::locks::{LockKey, LockTable};
use super::outcome::{parse_items, report, OrderOutcome, SettlementPhase, SettlementReceipt};
use super::validator::{assess, validate_shape, Assessment, PricedLine, Snapshot};
use crate::clients::{CatalogClient, ConsumptionClient, LedgerClient};
use crate::framework::ActorClient;
use crate::model::{
    AccountCreate, AccountId, LineItem, OrderLine, OrderRequest, Product, ProductCreate,
    ProductId, ProductUpdate, Session, StockLevel,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

/// Cloneable handle; clones share the lock table and the attempt counter.
#[derive(Clone)]
pub struct SettlementEngine {
    catalog: CatalogClient,
    ledger: LedgerClient,
    consumption: ConsumptionClient,
    locks: Arc<LockTable>,
    attempts: Arc<AtomicU64>,
}

impl SettlementEngine {
    pub fn new(
        catalog: CatalogClient,
        ledger: LedgerClient,
        consumption: ConsumptionClient,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            ledger,
            consumption,
            locks: Arc::new(LockTable::new(lock_timeout)),
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Row rights shared by every clone of this engine.
    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    pub fn consumption(&self) -> &ConsumptionClient {
        &self.consumption
    }

    /// Settles a cart for the session's account and returns the status code.
    pub async fn submit(
        &self,
        session: &Session,
        items: Vec<LineItem>,
    ) -> Result<u8, SettlementError> {
        report(self.settle(session.order(items)).await)
    }

    /// Like [`submit`](Self::submit), with the cart as a JSON array.
    pub async fn submit_json(&self, session: &Session, payload: &str) -> Result<u8, SettlementError> {
        let items = parse_items(payload)?;
        self.submit(session, items).await
    }

    /// Runs one settlement attempt to a terminal phase.
    pub async fn settle(&self, request: OrderRequest) -> Result<OrderOutcome, SettlementError> {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let span = info_span!("settlement", attempt, account_id = %request.account_id);

        async move {
            debug!(?request, "settle called");
            info!(phase = %SettlementPhase::Pending, items = request.items.len(), "Attempt received");

            let result = self.run_attempt(attempt, &request).await;

            let phase = SettlementPhase::of(&result);
            match &result {
                Ok(outcome) => info!(%phase, code = outcome.code(), "Attempt finished"),
                Err(e) => warn!(%phase, error = %e, retryable = e.is_retryable(), "Attempt finished"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_attempt(
        &self,
        attempt: u64,
        request: &OrderRequest,
    ) -> Result<OrderOutcome, SettlementError> {
        info!(phase = %SettlementPhase::Validating, "Validating");
        let lines = validate_shape(request)?;
        let account_id = request.account_id;
        let keys: Vec<LockKey> = lines
            .iter()
            .map(|line| LockKey::Product(line.product_id))
            .chain(std::iter::once(LockKey::Account(account_id)))
            .collect();

        let advisory = {
            let _shared = self.locks.shared(keys.iter().copied()).await?;
            let snapshot = self.read_snapshot(account_id, &lines).await?;
            assess(&snapshot)?
        };
        if let Err(rejection) = affordable(advisory) {
            debug!("Rejected on advisory snapshot");
            return Ok(rejection);
        }

        let rights = self.locks.exclusive(keys).await?;
        let snapshot = self.read_snapshot(account_id, &lines).await?;
        let (priced, total) = match affordable(assess(&snapshot)?) {
            Ok(priced) => priced,
            Err(rejection) => {
                debug!("Rejected under exclusive rights");
                return Ok(rejection);
            }
        };

        let execution = execute(&self.catalog, &self.ledger, account_id, &priced, total).await?;
        drop(rights);

        match execution {
            Execution::Refused(outcome) => Ok(outcome),
            Execution::Committed { remaining_balance } => {
                let receipt = SettlementReceipt {
                    attempt,
                    account_id,
                    lines: priced,
                    total,
                    remaining_balance,
                    settled_at: Utc::now(),
                };
                if let Err(e) = self.consumption.record(receipt.clone()).await {
                    warn!(error = %e, "Consumption not recorded");
                }
                Ok(OrderOutcome::Settled(receipt))
            }
        }
    }

    /// Reads every product (ascending) then the account.
    async fn read_snapshot(
        &self,
        account_id: AccountId,
        lines: &[OrderLine],
    ) -> Result<Snapshot, SettlementError> {
        let mut levels = Vec::with_capacity(lines.len());
        for line in lines {
            let level = self.catalog.stock_level(line.product_id).await?;
            levels.push((*line, level));
        }
        let balance = self.ledger.balance(account_id).await?;
        Ok(Snapshot {
            account_id,
            balance,
            levels,
        })
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, SettlementError> {
        Ok(self.catalog.create_product(params).await?)
    }

    /// Admin edit of stock and/or price, under the product's exclusive right.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, SettlementError> {
        let _rights = self.locks.exclusive([LockKey::Product(id)]).await?;
        Ok(self.catalog.update_product(id, update).await?)
    }

    /// Every product, ascending by id, read under shared rights on all of
    /// them so no settlement is seen half applied.
    ///
    /// Products created between the first listing and the re-read are not
    /// covered by the rights taken; the read is repeated with them included.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, SettlementError> {
        let mut ids: Vec<ProductId> = self
            .catalog
            .list()
            .await?
            .into_iter()
            .map(|product| product.id)
            .collect();
        loop {
            let _rights = self
                .locks
                .shared(ids.iter().map(|id| LockKey::Product(*id)))
                .await?;
            let products = self.catalog.list().await?;
            let covered = products
                .iter()
                .all(|product| ids.binary_search(&product.id).is_ok());
            if covered {
                return Ok(products);
            }
            debug!("Catalog grew during listing, retrying");
            ids = products.into_iter().map(|product| product.id).collect();
        }
    }

    #[instrument(skip(self))]
    pub async fn open_account(&self, params: AccountCreate) -> Result<AccountId, SettlementError> {
        Ok(self.ledger.open_account(params).await?)
    }

    /// Credits a positive amount; returns the new balance.
    #[instrument(skip(self))]
    pub async fn recharge(&self, id: AccountId, amount: Decimal) -> Result<Decimal, SettlementError> {
        let _rights = self.locks.exclusive([LockKey::Account(id)]).await?;
        let balance = self.ledger.credit(id, amount).await?;
        info!(%id, %balance, "Recharged");
        Ok(balance)
    }

    pub async fn stock_level(&self, id: ProductId) -> Result<StockLevel, SettlementError> {
        let _rights = self.locks.shared([LockKey::Product(id)]).await?;
        Ok(self.catalog.stock_level(id).await?)
    }

    pub async fn balance(&self, id: AccountId) -> Result<Decimal, SettlementError> {
        let _rights = self.locks.shared([LockKey::Account(id)]).await?;
        Ok(self.ledger.balance(id).await?)
    }
}

/// Splits an assessment into the priced order or the rejection to report.
fn affordable(assessment: Assessment) -> Result<(Vec<PricedLine>, Decimal), OrderOutcome> {
    match assessment {
        Assessment::Affordable { lines, total } => Ok((lines, total)),
        Assessment::ShortOfStock {
            product_id,
            requested,
            available,
        } => Err(OrderOutcome::RejectedInsufficientStock {
            product_id,
            requested,
            available,
        }),
        Assessment::ShortOfBalance {
            required,
            available,
        } => Err(OrderOutcome::RejectedInsufficientBalance {
            required,
            available,
        }),
    }
}
