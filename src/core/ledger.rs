//! Ledger arithmetic - pricing and stock adjustment planning.
//!
//! Nothing here touches the database. The purchase and sale transaction scripts ask this
//! module what a write means for stock (a list of [`StockAdjustment`]s) and what it costs
//! ([`line_total`]), then apply the result inside one database transaction.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of fractional digits every money amount carries.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a money column holds: ten digits, two of them fractional.
///
/// Amounts within this bound survive the round trip through a `REAL` column exactly
/// once re-normalized by [`money`].
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, MONEY_SCALE);

/// How editing or deleting a recorded purchase/sale affects stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockEditPolicy {
    /// Apply only the difference between the old and the new row; deletes undo the row.
    #[default]
    Delta,
    /// Re-apply the full new quantity on every edit and leave stock alone on delete.
    ReapplyFull,
}

/// Which way a ledger row moves stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Purchases bring goods in
    Inbound,
    /// Sales send goods out
    Outbound,
}

impl Direction {
    const fn signed(self, quantity: i32) -> i32 {
        match self {
            Self::Inbound => quantity,
            Self::Outbound => -quantity,
        }
    }
}

/// The stock-relevant part of a purchase or sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerLine {
    /// Product the row points at
    pub product_id: i64,
    /// Units on the row
    pub quantity: i32,
}

/// A signed change to one product's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    /// Product to adjust
    pub product_id: i64,
    /// Units to add (positive) or remove (negative)
    pub delta: i32,
}

/// Rejects zero and negative quantities.
pub fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

/// Rejects negative prices, prices with more than two fractional digits and prices
/// above [`MAX_MONEY`].
pub fn validate_price(price: Decimal) -> Result<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::InvalidPrice { price });
    }
    if price.normalize().scale() > MONEY_SCALE {
        return Err(Error::validation(format!(
            "price {price} has more than {MONEY_SCALE} decimal places"
        )));
    }
    if price > MAX_MONEY {
        return Err(Error::validation(format!(
            "price {price} exceeds the maximum of {MAX_MONEY}"
        )));
    }
    Ok(())
}

/// Normalizes a money amount to exactly two fractional digits.
///
/// Amounts read back from the database may carry float noise; rounding first keeps the
/// two-digit value the row was written with.
#[must_use]
pub fn money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(MONEY_SCALE);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// `quantity * unit_price`, exact, with two fractional digits.
///
/// # Errors
/// Returns [`Error::Validation`] when the total would exceed [`MAX_MONEY`].
pub fn line_total(quantity: i32, unit_price: Decimal) -> Result<Decimal> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .filter(|total| *total <= MAX_MONEY)
        .map(money)
        .ok_or_else(|| {
            Error::validation(format!(
                "total of {quantity} x {unit_price} exceeds the maximum of {MAX_MONEY}"
            ))
        })
}

/// Stock change caused by recording a new row.
#[must_use]
pub const fn adjustment_for_record(direction: Direction, line: LedgerLine) -> StockAdjustment {
    StockAdjustment {
        product_id: line.product_id,
        delta: direction.signed(line.quantity),
    }
}

/// Stock changes caused by replacing `old` with `new`.
///
/// Zero adjustments are dropped, so an edit that only touches the date or the price
/// produces no stock writes under [`StockEditPolicy::Delta`].
#[must_use]
pub fn adjustments_for_edit(
    policy: StockEditPolicy,
    direction: Direction,
    old: LedgerLine,
    new: LedgerLine,
) -> Vec<StockAdjustment> {
    let adjustments = match policy {
        StockEditPolicy::ReapplyFull => vec![adjustment_for_record(direction, new)],
        StockEditPolicy::Delta if old.product_id == new.product_id => vec![StockAdjustment {
            product_id: new.product_id,
            delta: direction.signed(new.quantity - old.quantity),
        }],
        StockEditPolicy::Delta => vec![
            StockAdjustment {
                product_id: old.product_id,
                delta: -direction.signed(old.quantity),
            },
            adjustment_for_record(direction, new),
        ],
    };

    adjustments.into_iter().filter(|a| a.delta != 0).collect()
}

/// Stock changes caused by deleting `old`.
#[must_use]
pub fn adjustments_for_removal(
    policy: StockEditPolicy,
    direction: Direction,
    old: LedgerLine,
) -> Vec<StockAdjustment> {
    match policy {
        StockEditPolicy::ReapplyFull => Vec::new(),
        StockEditPolicy::Delta => vec![StockAdjustment {
            product_id: old.product_id,
            delta: -direction.signed(old.quantity),
        }],
    }
}
