//! Sale recording - goods going out to a customer.
//!
//! Mirrors the purchase scripts with stock moving the other way. A sale is refused when
//! it asks for more units than are on hand, and the stock guard in
//! [`crate::core::stock::adjust_stock`] keeps that true under concurrent writers.

use crate::{
    core::{
        AccountId,
        customer::require_customer,
        ledger::{
            Direction, LedgerLine, StockEditPolicy, adjustment_for_record, adjustments_for_edit,
            adjustments_for_removal, line_total, money, validate_price, validate_quantity,
        },
        product::require_product,
        query::{ListParams, Page, PageLimits, fetch_page, unknown_ordering},
        stock::apply_adjustments,
    },
    entities::{Sale, customer, product, sale},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    Condition, ConnectionTrait, JoinType, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

const ORDERING_FIELDS: &[&str] = &["created_at", "updated_at", "sale_date", "total_price"];

/// Fields accepted when recording or replacing a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleInput {
    /// Product being sold
    pub product_id: i64,
    /// Customer buying it
    pub customer_id: i64,
    /// Units sold, must be positive
    pub quantity: i32,
    /// Calendar date of the sale
    pub sale_date: NaiveDate,
    /// Price per unit; the product's current price when omitted
    #[serde(default)]
    pub sale_price: Option<Decimal>,
}

impl SaleInput {
    fn validate(&self) -> Result<()> {
        validate_quantity(self.quantity)?;
        if let Some(price) = self.sale_price {
            validate_price(price)?;
        }
        Ok(())
    }

    const fn line(&self) -> LedgerLine {
        LedgerLine {
            product_id: self.product_id,
            quantity: self.quantity,
        }
    }

    fn resolved_price(&self, product: &product::Model) -> Decimal {
        money(self.sale_price.unwrap_or(product.price))
    }
}

/// Exact-match filters for sale listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleFilter {
    /// Product id
    pub product_id: Option<i64>,
    /// Customer id
    pub customer_id: Option<i64>,
}

const fn recorded_line(sale: &sale::Model) -> LedgerLine {
    LedgerLine {
        product_id: sale.product_id,
        quantity: sale.quantity,
    }
}

/// Finds a sale owned by `owner`.
pub async fn get_sale<C>(db: &C, owner: AccountId, sale_id: i64) -> Result<Option<sale::Model>>
where
    C: ConnectionTrait,
{
    Sale::find_by_id(sale_id)
        .filter(sale::Column::OwnerId.eq(owner))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_sale`] but treats a missing sale as [`Error::SaleNotFound`].
pub async fn require_sale<C>(db: &C, owner: AccountId, sale_id: i64) -> Result<sale::Model>
where
    C: ConnectionTrait,
{
    get_sale(db, owner, sale_id)
        .await?
        .ok_or(Error::SaleNotFound { id: sale_id })
}

/// Records a sale and removes its quantity from the product's stock.
///
/// # Errors
/// - [`Error::InvalidQuantity`] / [`Error::InvalidPrice`] for bad input
/// - [`Error::ProductNotFound`] / [`Error::CustomerNotFound`] when either reference is
///   missing or owned by another account
/// - [`Error::InsufficientStock`] when `quantity` exceeds the units on hand
#[instrument(skip(db, input), fields(product_id = input.product_id))]
pub async fn record_sale(db: &DatabaseConnection, owner: AccountId, input: SaleInput) -> Result<sale::Model> {
    input.validate()?;

    let txn = db.begin().await?;
    let product = require_product(&txn, owner, input.product_id).await?;
    require_customer(&txn, owner, input.customer_id).await?;

    if input.quantity > product.quantity_in_stock {
        warn!(
            available = product.quantity_in_stock,
            requested = input.quantity,
            "Sale refused"
        );
        return Err(Error::InsufficientStock {
            product_id: product.id,
            available: product.quantity_in_stock,
            requested: input.quantity,
        });
    }

    let sale_price = input.resolved_price(&product);
    let total_price = line_total(input.quantity, sale_price)?;
    apply_adjustments(
        &txn,
        owner,
        &[adjustment_for_record(Direction::Outbound, input.line())],
    )
    .await?;

    let now = chrono::Utc::now();
    let sale = sale::ActiveModel {
        owner_id: Set(owner),
        product_id: Set(input.product_id),
        customer_id: Set(input.customer_id),
        quantity: Set(input.quantity),
        sale_date: Set(input.sale_date),
        sale_price: Set(sale_price),
        total_price: Set(total_price),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(
        sale_id = sale.id,
        quantity = sale.quantity,
        total_price = %sale.total_price,
        "Sale recorded"
    );
    Ok(sale)
}

/// Lists `owner`'s sales.
///
/// Search matches product and customer names; ordering accepts `created_at` (default),
/// `updated_at`, `sale_date` and `total_price`.
pub async fn list_sales(
    db: &DatabaseConnection,
    owner: AccountId,
    params: &ListParams,
    filter: &SaleFilter,
    limits: PageLimits,
) -> Result<Page<sale::Model>> {
    let mut select = Sale::find()
        .join(JoinType::InnerJoin, sale::Relation::Product.def())
        .join(JoinType::InnerJoin, sale::Relation::Customer.def())
        .filter(sale::Column::OwnerId.eq(owner));

    if let Some(product_id) = filter.product_id {
        select = select.filter(sale::Column::ProductId.eq(product_id));
    }
    if let Some(customer_id) = filter.customer_id {
        select = select.filter(sale::Column::CustomerId.eq(customer_id));
    }
    if let Some(term) = params.search_term() {
        select = select.filter(
            Condition::any()
                .add(product::Column::Name.contains(term))
                .add(customer::Column::Name.contains(term)),
        );
    }

    let (field, order) = params.ordering("created_at");
    let column = match field {
        "created_at" => sale::Column::CreatedAt,
        "updated_at" => sale::Column::UpdatedAt,
        "sale_date" => sale::Column::SaleDate,
        "total_price" => sale::Column::TotalPrice,
        other => return Err(unknown_ordering(other, ORDERING_FIELDS)),
    };
    let select = select.order_by(column, order).order_by_asc(sale::Column::Id);

    fetch_page(db, select, params, limits).await
}

/// Replaces a sale, moving stock according to `policy`.
///
/// An omitted `sale_price` resolves to the (new) product's current price.
#[instrument(skip(db, input))]
pub async fn update_sale(
    db: &DatabaseConnection,
    owner: AccountId,
    sale_id: i64,
    input: SaleInput,
    policy: StockEditPolicy,
) -> Result<sale::Model> {
    input.validate()?;

    let txn = db.begin().await?;
    let existing = require_sale(&txn, owner, sale_id).await?;
    let product = require_product(&txn, owner, input.product_id).await?;
    require_customer(&txn, owner, input.customer_id).await?;

    let sale_price = input.resolved_price(&product);
    let total_price = line_total(input.quantity, sale_price)?;

    let adjustments =
        adjustments_for_edit(policy, Direction::Outbound, recorded_line(&existing), input.line());
    apply_adjustments(&txn, owner, &adjustments).await?;

    let mut sale: sale::ActiveModel = existing.into();
    sale.product_id = Set(input.product_id);
    sale.customer_id = Set(input.customer_id);
    sale.quantity = Set(input.quantity);
    sale.sale_date = Set(input.sale_date);
    sale.sale_price = Set(sale_price);
    sale.total_price = Set(total_price);
    sale.updated_at = Set(chrono::Utc::now());
    let sale = sale.update(&txn).await?;

    txn.commit().await?;
    info!(sale_id, ?policy, "Sale updated");
    Ok(sale)
}

/// Deletes a sale; under [`StockEditPolicy::Delta`] its units return to stock.
#[instrument(skip(db))]
pub async fn delete_sale(
    db: &DatabaseConnection,
    owner: AccountId,
    sale_id: i64,
    policy: StockEditPolicy,
) -> Result<()> {
    let txn = db.begin().await?;
    let existing = require_sale(&txn, owner, sale_id).await?;

    let adjustments = adjustments_for_removal(policy, Direction::Outbound, recorded_line(&existing));
    apply_adjustments(&txn, owner, &adjustments).await?;

    Sale::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;
    info!(sale_id, "Sale deleted");
    Ok(())
}
