//! Order validation.
//!
//! Two stages. [`validate_shape`] looks only at the request and runs before any
//! storage access. [`assess`] is a pure function of the validated lines and a
//! [`Snapshot`] of the rows they touch; the engine calls it once on the
//! advisory snapshot and again on the snapshot re-read under exclusive rights.

use crate::model::{AccountId, OrderLine, OrderRequest, ProductId, StockLevel};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Ways a request can be malformed. These are caller bugs, never business
/// outcomes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MalformedOrder {
    #[error("No items in the order")]
    Empty,

    #[error("Quantity for {product_id} must be positive, got {quantity}")]
    NonPositiveQuantity { product_id: ProductId, quantity: i64 },

    #[error("Quantity for {product_id} is too large: {quantity}")]
    QuantityTooLarge { product_id: ProductId, quantity: i64 },

    #[error("{0} appears more than once")]
    DuplicateProduct(ProductId),

    #[error("Order total overflows")]
    AmountOverflow,

    #[error("Unreadable order payload: {0}")]
    Unparseable(String),
}

/// Checks the request shape and returns its lines in ascending product order.
pub fn validate_shape(request: &OrderRequest) -> Result<Vec<OrderLine>, MalformedOrder> {
    if request.items.is_empty() {
        return Err(MalformedOrder::Empty);
    }

    let mut seen = HashSet::with_capacity(request.items.len());
    let mut lines = Vec::with_capacity(request.items.len());
    for item in &request.items {
        let product_id = item.product_id;
        if item.quantity <= 0 {
            return Err(MalformedOrder::NonPositiveQuantity {
                product_id,
                quantity: item.quantity,
            });
        }
        let quantity = u32::try_from(item.quantity).map_err(|_| MalformedOrder::QuantityTooLarge {
            product_id,
            quantity: item.quantity,
        })?;
        if !seen.insert(product_id) {
            return Err(MalformedOrder::DuplicateProduct(product_id));
        }
        lines.push(OrderLine {
            product_id,
            quantity,
        });
    }

    lines.sort();
    Ok(lines)
}

/// The rows one order touches, read at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub account_id: AccountId,
    pub balance: Decimal,
    /// One entry per line, in the same order as the lines.
    pub levels: Vec<(OrderLine, StockLevel)>,
}

/// A line with its price fixed at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    /// Stock the line was validated against.
    #[serde(skip)]
    pub stock: u32,
}

/// What the validator concluded from a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    Affordable {
        lines: Vec<PricedLine>,
        total: Decimal,
    },
    ShortOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
    ShortOfBalance {
        required: Decimal,
        available: Decimal,
    },
}

/// Stock first (first short line in ascending product order), then the
/// checked total, then the balance.
pub fn assess(snapshot: &Snapshot) -> Result<Assessment, MalformedOrder> {
    if let Some((line, level)) = snapshot
        .levels
        .iter()
        .find(|(line, level)| line.quantity > level.stock)
    {
        return Ok(Assessment::ShortOfStock {
            product_id: line.product_id,
            requested: line.quantity,
            available: level.stock,
        });
    }

    let mut total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(snapshot.levels.len());
    for (line, level) in &snapshot.levels {
        let line_total = level
            .price
            .checked_mul(Decimal::from(line.quantity))
            .ok_or(MalformedOrder::AmountOverflow)?;
        total = total
            .checked_add(line_total)
            .ok_or(MalformedOrder::AmountOverflow)?;
        lines.push(PricedLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: level.price,
            line_total,
            stock: level.stock,
        });
    }

    if total > snapshot.balance {
        return Ok(Assessment::ShortOfBalance {
            required: total,
            available: snapshot.balance,
        });
    }
    Ok(Assessment::Affordable { lines, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;
    use rust_decimal_macros::dec;

    fn request(items: &[(u32, i64)]) -> OrderRequest {
        OrderRequest {
            account_id: AccountId(1),
            items: items
                .iter()
                .map(|&(id, qty)| LineItem::new(ProductId(id), qty))
                .collect(),
        }
    }

    fn snapshot(balance: Decimal, levels: &[(u32, u32, Decimal, u32)]) -> Snapshot {
        Snapshot {
            account_id: AccountId(1),
            balance,
            levels: levels
                .iter()
                .map(|&(id, quantity, price, stock)| {
                    (
                        OrderLine {
                            product_id: ProductId(id),
                            quantity,
                        },
                        StockLevel { price, stock },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn shape_errors() {
        assert_eq!(validate_shape(&request(&[])), Err(MalformedOrder::Empty));
        assert_eq!(
            validate_shape(&request(&[(1, 2), (2, 0)])),
            Err(MalformedOrder::NonPositiveQuantity {
                product_id: ProductId(2),
                quantity: 0
            })
        );
        assert_eq!(
            validate_shape(&request(&[(1, -3)])),
            Err(MalformedOrder::NonPositiveQuantity {
                product_id: ProductId(1),
                quantity: -3
            })
        );
        assert_eq!(
            validate_shape(&request(&[(1, i64::from(u32::MAX) + 1)])),
            Err(MalformedOrder::QuantityTooLarge {
                product_id: ProductId(1),
                quantity: i64::from(u32::MAX) + 1
            })
        );
        assert_eq!(
            validate_shape(&request(&[(4, 1), (2, 1), (4, 2)])),
            Err(MalformedOrder::DuplicateProduct(ProductId(4)))
        );
    }

    #[test]
    fn lines_come_back_in_product_order() {
        let lines = validate_shape(&request(&[(9, 1), (3, 2), (5, 3)])).unwrap();
        let ids: Vec<u32> = lines.iter().map(|l| l.product_id.0).collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }

    #[test]
    fn first_short_line_in_product_order_is_reported() {
        let snap = snapshot(
            dec!(1000),
            &[(1, 1, dec!(1), 5), (2, 4, dec!(1), 3), (3, 9, dec!(1), 0)],
        );
        assert_eq!(
            assess(&snap).unwrap(),
            Assessment::ShortOfStock {
                product_id: ProductId(2),
                requested: 4,
                available: 3
            }
        );
    }

    #[test]
    fn stock_is_checked_before_balance() {
        let snap = snapshot(dec!(0), &[(1, 2, dec!(10), 1)]);
        assert!(matches!(
            assess(&snap).unwrap(),
            Assessment::ShortOfStock { .. }
        ));
    }

    #[test]
    fn balance_shortfall_reports_required_total() {
        let snap = snapshot(dec!(5), &[(1, 2, dec!(10), 5)]);
        assert_eq!(
            assess(&snap).unwrap(),
            Assessment::ShortOfBalance {
                required: dec!(20),
                available: dec!(5)
            }
        );
    }

    #[test]
    fn exact_balance_is_affordable() {
        let snap = snapshot(dec!(7.50), &[(1, 3, dec!(2.50), 3)]);
        match assess(&snap).unwrap() {
            Assessment::Affordable { lines, total } => {
                assert_eq!(total, dec!(7.50));
                assert_eq!(lines[0].line_total, dec!(7.50));
                assert_eq!(lines[0].stock, 3);
            }
            other => panic!("expected affordable, got {other:?}"),
        }
    }

    #[test]
    fn total_overflow_is_malformed() {
        let snap = snapshot(Decimal::MAX, &[(1, u32::MAX, Decimal::MAX, u32::MAX)]);
        assert_eq!(assess(&snap), Err(MalformedOrder::AmountOverflow));
    }
}
