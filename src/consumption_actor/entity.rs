//! [`ActorEntity`] implementation for [`ConsumptionRecord`].
//!
//! Records are append-only, so the update and action types are uninhabited.

use super::error::ConsumptionError;
use crate::framework::ActorEntity;
use crate::model::{ConsumptionCreate, ConsumptionRecord, RecordId};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::convert::Infallible;

#[async_trait]
impl ActorEntity for ConsumptionRecord {
    type Id = RecordId;
    type Create = ConsumptionCreate;
    type Update = Infallible;
    type Action = Infallible;
    type ActionResult = Infallible;
    type Context = ();
    type Error = ConsumptionError;

    fn from_create_params(
        id: RecordId,
        params: ConsumptionCreate,
    ) -> Result<Self, ConsumptionError> {
        if params.amount <= Decimal::ZERO {
            return Err(ConsumptionError::InvalidAmount(params.amount));
        }
        let first_day = format!("{}-01", params.month);
        if params.month.len() != 7 || NaiveDate::parse_from_str(&first_day, "%Y-%m-%d").is_err() {
            return Err(ConsumptionError::InvalidMonth(params.month));
        }
        Ok(Self {
            id,
            attempt: params.attempt,
            month: params.month,
            account_id: params.account_id,
            product_id: params.product_id,
            quantity: params.quantity,
            amount: params.amount,
        })
    }

    async fn on_update(&mut self, update: Infallible, _ctx: &()) -> Result<(), ConsumptionError> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: Infallible,
        _ctx: &(),
    ) -> Result<Infallible, ConsumptionError> {
        match action {}
    }
}
