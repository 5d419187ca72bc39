//! Consumption records: one actor owning every settled line.
//!
//! The engine writes here after each commit. The back office reads monthly
//! spending and product shares from the same rows. Recording never contends
//! with the catalog or the ledger.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::ConsumptionClient;
use crate::framework::ResourceActor;
use crate::model::ConsumptionRecord;

/// Creates the consumption actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<ConsumptionRecord>, ConsumptionClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, ConsumptionClient::new(generic_client))
}
