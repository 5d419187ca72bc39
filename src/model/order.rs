//! Order requests as they arrive from the cart.
//!
//! An [`OrderRequest`] is transient: it lives for one settlement attempt and is
//! never stored. Its wire shape is
//!
//! ```json
//! { "account_id": 1, "items": [{ "product_id": 3, "quantity": 2 }] }
//! ```

use crate::model::{AccountId, ProductId};
use serde::{Deserialize, Serialize};

/// One requested (product, quantity) pair, exactly as the caller sent it.
///
/// `quantity` is signed so that a zero or negative value can be reported as a
/// malformed request instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A purchase submitted on behalf of one paying account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub account_id: AccountId,
    pub items: Vec<LineItem>,
}

/// The authenticated caller, supplied by the session layer.
///
/// The engine trusts the account id carried here and never looks for the payer
/// anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account_id: AccountId,
}

impl Session {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }

    /// Builds a request paid by this session's account.
    pub fn order(&self, items: impl IntoIterator<Item = LineItem>) -> OrderRequest {
        OrderRequest {
            account_id: self.account_id,
            items: items.into_iter().collect(),
        }
    }
}

/// A line that passed shape validation: positive quantity, unique product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}
