/// A product row in the café catalog.
///
/// # Actor Framework
/// Implements [`ActorEntity`](crate::framework::ActorEntity) (see
/// [`catalog_actor::entity`](crate::catalog_actor::entity)), so the whole catalog is owned by one
/// [`ResourceActor`](crate::framework::ResourceActor).
///
/// - Creation parameters: [`ProductCreate`]
/// - Admin edit: [`ProductUpdate`]
/// - Conditional actions: [`ProductAction`](crate::catalog_actor::ProductAction)
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for products. Ordering is the global lock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    /// Unit price; always positive.
    pub price: Decimal,
    pub stock: u32,
}

impl Product {
    /// The read-only part of the row the settlement path cares about.
    pub fn stock_level(&self) -> StockLevel {
        StockLevel {
            price: self.price,
            stock: self.stock,
        }
    }
}

/// Price and stock of one product at the moment it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub price: Decimal,
    pub stock: u32,
}

/// Payload for adding a product to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock: u32,
}

/// Admin edit: direct set of stock and/or price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub stock: Option<u32>,
    pub price: Option<Decimal>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.stock.is_none() && self.price.is_none()
    }
}
