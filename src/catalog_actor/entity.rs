//! [`ActorEntity`] implementation for [`Product`].
//!
//! Creation and admin edits validate name and price, and no two products share
//! a name. Stock changes made by the
//! settlement path go through [`ProductAction`] so that the stock check and the
//! write happen in one actor turn.

use super::actions::{ProductAction, ProductActionResult, StockChange};
use super::error::ProductError;
use crate::framework::ActorEntity;
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use async_trait::async_trait;
use rust_decimal::Decimal;

fn check_price(price: Decimal) -> Result<Decimal, ProductError> {
    if price <= Decimal::ZERO {
        return Err(ProductError::InvalidPrice(price));
    }
    Ok(price)
}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Context = ();
    type Error = ProductError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, ProductError> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err(ProductError::InvalidName);
        }
        Ok(Self {
            id,
            name: name.to_string(),
            category: params.category.filter(|c| !c.trim().is_empty()),
            price: check_price(params.price)?,
            stock: params.stock,
        })
    }

    fn check_conflict(&self, other: &Self) -> Result<(), ProductError> {
        if self.name == other.name {
            return Err(ProductError::DuplicateName(self.name.clone()));
        }
        Ok(())
    }

    /// Direct set of stock and/or price. An empty update changes nothing.
    async fn on_update(&mut self, update: ProductUpdate, _ctx: &()) -> Result<(), ProductError> {
        if let Some(price) = update.price {
            self.price = check_price(price)?;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &(),
    ) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::TryDecrement {
                quantity,
                expected_min_stock,
            } => {
                let change = if self.stock >= quantity.max(expected_min_stock) {
                    self.stock -= quantity;
                    StockChange::Applied {
                        remaining: self.stock,
                    }
                } else {
                    StockChange::Insufficient {
                        available: self.stock,
                    }
                };
                Ok(ProductActionResult::TryDecrement(change))
            }
            ProductAction::Restock { quantity } => {
                self.stock = self
                    .stock
                    .checked_add(quantity)
                    .ok_or(ProductError::StockOverflow {
                        stock: self.stock,
                        quantity,
                    })?;
                Ok(ProductActionResult::Restock(self.stock))
            }
        }
    }
}
