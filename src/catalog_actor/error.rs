//! Error types for the catalog actor.

use crate::model::ProductId;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Goods with ID {0} not found")]
    NotFound(ProductId),

    #[error("Product name must not be empty")]
    InvalidName,

    #[error("Goods with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Product price must be positive, got {0}")]
    InvalidPrice(rust_decimal::Decimal),

    /// A restock would push the counter past `u32::MAX`.
    #[error("Stock overflow: {stock} + {quantity}")]
    StockOverflow { stock: u32, quantity: u32 },

    /// The actor could not be reached or dropped the reply.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ProductError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProductError::ActorCommunicationError(_))
    }
}
