//! Stock adjustment - the only code path that changes `quantity_in_stock` as a side effect
//! of ledger writes.
//!
//! Callers pass the open transaction they are working in, so the adjustment commits or
//! rolls back together with the purchase/sale row that caused it.

use crate::{
    core::{AccountId, ledger::StockAdjustment, product::require_product},
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, instrument};

/// Adds `delta` units to a product's stock.
///
/// The change is a single conditional update (`quantity_in_stock = quantity_in_stock + delta`
/// guarded by `quantity_in_stock >= -delta` when removing stock), so two writers racing on the
/// same product can never push it below zero; the loser gets [`Error::InsufficientStock`].
///
/// # Errors
/// - [`Error::ProductNotFound`] if the product does not exist or belongs to another account
/// - [`Error::InsufficientStock`] if removing `-delta` units would make stock negative
#[instrument(skip(db))]
pub async fn adjust_stock<C>(
    db: &C,
    owner: AccountId,
    product_id: i64,
    delta: i32,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let mut update = Product::update_many()
        .col_expr(
            product::Column::QuantityInStock,
            Expr::col(product::Column::QuantityInStock).add(delta),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::OwnerId.eq(owner));

    if delta < 0 {
        update = update.filter(product::Column::QuantityInStock.gte(-delta));
    }

    let result = update.exec(db).await?;
    let product = require_product(db, owner, product_id).await?;

    if result.rows_affected == 0 {
        return Err(Error::InsufficientStock {
            product_id,
            available: product.quantity_in_stock,
            requested: -delta,
        });
    }

    debug!(
        product_id,
        delta,
        quantity_in_stock = product.quantity_in_stock,
        "Stock adjusted"
    );
    Ok(product)
}

/// Applies a batch of adjustments in order, stopping at the first failure.
///
/// Run it inside a transaction: a failure part-way leaves earlier adjustments applied
/// until the transaction is rolled back.
pub async fn apply_adjustments<C>(
    db: &C,
    owner: AccountId,
    adjustments: &[StockAdjustment],
) -> Result<()>
where
    C: ConnectionTrait,
{
    for adjustment in adjustments {
        adjust_stock(db, owner, adjustment.product_id, adjustment.delta).await?;
    }
    Ok(())
}
