//! The Account Ledger: one actor owning every account row.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::LedgerClient;
use crate::framework::ResourceActor;
use crate::model::Account;

/// Creates the ledger actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Account>, LedgerClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, LedgerClient::new(generic_client))
}
