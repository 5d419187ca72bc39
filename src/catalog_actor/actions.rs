//! Conditional operations on a single product row.
//!
//! These run inside the catalog actor loop, so the check and the write of a
//! [`ProductAction::TryDecrement`] cannot be split by another request.

/// Stock operations beyond plain CRUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAction {
    /// Reads the current stock without modifying it.
    CheckStock,
    /// Takes `quantity` units, but only if at least
    /// `max(quantity, expected_min_stock)` are on the shelf.
    TryDecrement { quantity: u32, expected_min_stock: u32 },
    /// Puts units back. Used by settlement rollback.
    Restock { quantity: u32 },
}

/// Results from [`ProductAction`]; variants match 1:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductActionResult {
    CheckStock(u32),
    TryDecrement(StockChange),
    /// Stock after the restock.
    Restock(u32),
}

/// Outcome of a conditional decrement. A shortfall is a normal answer, not an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    Applied { remaining: u32 },
    Insufficient { available: u32 },
}
