//! Conditional balance operations on a single account row.

use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    CheckBalance,
    /// Debits only if the balance covers the amount.
    TryDebit(Decimal),
    /// Adds a positive amount. Used by recharge and by settlement rollback.
    Credit(Decimal),
}

/// Results from [`AccountAction`]; variants match 1:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountActionResult {
    CheckBalance(Decimal),
    TryDebit(BalanceChange),
    /// Balance after the credit.
    Credit(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    Applied { remaining: Decimal },
    Insufficient { available: Decimal },
}
