use crate::consumption_actor::ConsumptionError;
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{
    AccountId, ConsumptionCreate, ConsumptionRecord, MonthlyTotal, ProductId, ProductShare,
    RecordId,
};
use crate::settlement::SettlementReceipt;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Client for the consumption actor.
///
/// Writes are one record per settled line. Reports are computed here from a
/// listing, so the actor stays a plain row store.
#[derive(Clone)]
pub struct ConsumptionClient {
    inner: ResourceClient<ConsumptionRecord>,
}

#[async_trait]
impl ActorClient<ConsumptionRecord> for ConsumptionClient {
    type Error = ConsumptionError;

    fn inner(&self) -> &ResourceClient<ConsumptionRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> ConsumptionError {
        match e.into_entity_error::<ConsumptionError>() {
            Ok(typed) => typed,
            Err(other) => ConsumptionError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl ConsumptionClient {
    pub fn new(inner: ResourceClient<ConsumptionRecord>) -> Self {
        Self { inner }
    }

    /// Stores every line of a committed settlement.
    ///
    /// Lines are sent in receipt order; a failure stops at the failing line
    /// and leaves the earlier ones stored.
    #[instrument(skip_all, fields(attempt = receipt.attempt))]
    pub async fn record(&self, receipt: SettlementReceipt) -> Result<Vec<RecordId>, ConsumptionError> {
        let month = receipt.month();
        let mut ids = Vec::with_capacity(receipt.lines.len());
        for line in &receipt.lines {
            let params = ConsumptionCreate {
                attempt: receipt.attempt,
                month: month.clone(),
                account_id: receipt.account_id,
                product_id: line.product_id,
                quantity: line.quantity,
                amount: line.line_total,
            };
            ids.push(self.inner.create(params).await.map_err(Self::map_error)?);
        }
        debug!(%month, lines = ids.len(), "Recorded");
        Ok(ids)
    }

    /// Monthly totals across every account, ascending by month.
    #[instrument(skip(self))]
    pub async fn monthly_summary(&self) -> Result<Vec<MonthlyTotal>, ConsumptionError> {
        Ok(monthly_totals(&self.list().await?, None))
    }

    /// Monthly totals of one account, ascending by month.
    #[instrument(skip(self))]
    pub async fn account_monthly(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<MonthlyTotal>, ConsumptionError> {
        Ok(monthly_totals(&self.list().await?, Some(account_id)))
    }

    /// Spending per product in `month`, largest first.
    #[instrument(skip(self))]
    pub async fn product_share(&self, month: &str) -> Result<Vec<ProductShare>, ConsumptionError> {
        Ok(product_share(&self.list().await?, month))
    }
}

fn monthly_totals(records: &[ConsumptionRecord], account_id: Option<AccountId>) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<&str, Decimal> = BTreeMap::new();
    for record in records {
        if account_id.is_some_and(|wanted| wanted != record.account_id) {
            continue;
        }
        *by_month.entry(record.month.as_str()).or_default() += record.amount;
    }
    by_month
        .into_iter()
        .map(|(month, amount)| MonthlyTotal {
            month: month.to_string(),
            amount,
        })
        .collect()
}

/// Descending by amount, ties by product id.
fn product_share(records: &[ConsumptionRecord], month: &str) -> Vec<ProductShare> {
    let mut by_product: BTreeMap<ProductId, Decimal> = BTreeMap::new();
    for record in records.iter().filter(|r| r.month == month) {
        *by_product.entry(record.product_id).or_default() += record.amount;
    }
    let mut shares: Vec<ProductShare> = by_product
        .into_iter()
        .map(|(product_id, amount)| ProductShare { product_id, amount })
        .collect();
    shares.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.product_id.cmp(&b.product_id)));
    shares
}
