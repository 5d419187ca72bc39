use crate::model::{AccountId, ProductId};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for consumption records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u32);

impl From<u32> for RecordId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record_{}", self.0)
    }
}

/// One settled line, kept for the spending reports.
///
/// Records are append-only: the consumption actor accepts no updates or
/// actions on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub id: RecordId,
    /// Settlement attempt that produced the line.
    pub attempt: u64,
    /// `YYYY-MM`, UTC.
    pub month: String,
    pub account_id: AccountId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionCreate {
    pub attempt: u64,
    pub month: String,
    pub account_id: AccountId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub amount: Decimal,
}

/// Amount spent in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub amount: Decimal,
}

/// Amount spent on one product in a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductShare {
    pub product_id: ProductId,
    pub amount: Decimal,
}

/// The current calendar month, `YYYY-MM`, in UTC.
pub fn current_month() -> String {
    Utc::now().format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_month_has_calendar_shape() {
        let month = current_month();
        assert_eq!(month.len(), 7);
        assert_eq!(&month[4..5], "-");
    }
}
