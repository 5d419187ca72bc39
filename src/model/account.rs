use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for customer accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u32);

impl From<u32> for AccountId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "account_{}", self.0)
    }
}

/// A customer account with a prepaid balance.
///
/// Owned by the ledger actor; see [`ledger_actor::entity`](crate::ledger_actor::entity).
/// The balance never goes negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub balance: Decimal,
}

/// Payload for opening an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCreate {
    pub username: String,
    #[serde(default)]
    pub opening_balance: Decimal,
}

/// Profile edit. The balance only moves through
/// [`AccountAction`](crate::ledger_actor::AccountAction).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub username: Option<String>,
}
