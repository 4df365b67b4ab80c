//! Purchase recording - goods coming in from a supplier.
//!
//! Every write runs as one transaction script: validate, check ownership of the referenced
//! product and supplier, move stock, write the row, commit. Any failure drops the
//! transaction, so stock and the purchase table never disagree.

use crate::{
    core::{
        AccountId,
        ledger::{
            Direction, LedgerLine, StockEditPolicy, adjustment_for_record, adjustments_for_edit,
            adjustments_for_removal, line_total, money, validate_price, validate_quantity,
        },
        product::require_product,
        query::{ListParams, Page, PageLimits, fetch_page, unknown_ordering},
        stock::apply_adjustments,
        supplier::require_supplier,
    },
    entities::{Purchase, product, purchase, supplier},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    Condition, ConnectionTrait, JoinType, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
};
use serde::Deserialize;
use tracing::{info, instrument};

const ORDERING_FIELDS: &[&str] = &["created_at", "updated_at", "purchase_date", "total_price"];

/// Fields accepted when recording or replacing a purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseInput {
    /// Product receiving the stock
    pub product_id: i64,
    /// Supplier the goods came from
    pub supplier_id: i64,
    /// Units bought, must be positive
    pub quantity: i32,
    /// Calendar date of the purchase
    pub purchase_date: NaiveDate,
    /// Cost per unit
    pub unit_cost_price: Decimal,
}

impl PurchaseInput {
    fn validate(&self) -> Result<()> {
        validate_quantity(self.quantity)?;
        validate_price(self.unit_cost_price)
    }

    const fn line(&self) -> LedgerLine {
        LedgerLine {
            product_id: self.product_id,
            quantity: self.quantity,
        }
    }
}

/// Exact-match filters for purchase listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseFilter {
    /// Product id
    pub product_id: Option<i64>,
    /// Supplier id
    pub supplier_id: Option<i64>,
    /// Purchase date
    pub purchase_date: Option<NaiveDate>,
}

const fn recorded_line(purchase: &purchase::Model) -> LedgerLine {
    LedgerLine {
        product_id: purchase.product_id,
        quantity: purchase.quantity,
    }
}

/// Finds a purchase owned by `owner`.
pub async fn get_purchase<C>(
    db: &C,
    owner: AccountId,
    purchase_id: i64,
) -> Result<Option<purchase::Model>>
where
    C: ConnectionTrait,
{
    Purchase::find_by_id(purchase_id)
        .filter(purchase::Column::OwnerId.eq(owner))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_purchase`] but treats a missing purchase as [`Error::PurchaseNotFound`].
pub async fn require_purchase<C>(
    db: &C,
    owner: AccountId,
    purchase_id: i64,
) -> Result<purchase::Model>
where
    C: ConnectionTrait,
{
    get_purchase(db, owner, purchase_id)
        .await?
        .ok_or(Error::PurchaseNotFound { id: purchase_id })
}

/// Records a purchase and adds its quantity to the product's stock.
///
/// `total_price` is computed here as `quantity * unit_cost_price`; callers cannot set it.
///
/// # Errors
/// - [`Error::InvalidQuantity`] / [`Error::InvalidPrice`] for bad input
/// - [`Error::ProductNotFound`] / [`Error::SupplierNotFound`] when either reference is
///   missing or owned by another account
#[instrument(skip(db, input), fields(product_id = input.product_id))]
pub async fn record_purchase(
    db: &DatabaseConnection,
    owner: AccountId,
    input: PurchaseInput,
) -> Result<purchase::Model> {
    input.validate()?;
    let total_price = line_total(input.quantity, input.unit_cost_price)?;

    let txn = db.begin().await?;
    require_product(&txn, owner, input.product_id).await?;
    require_supplier(&txn, owner, input.supplier_id).await?;

    apply_adjustments(
        &txn,
        owner,
        &[adjustment_for_record(Direction::Inbound, input.line())],
    )
    .await?;

    let now = chrono::Utc::now();
    let purchase = purchase::ActiveModel {
        owner_id: Set(owner),
        product_id: Set(input.product_id),
        supplier_id: Set(input.supplier_id),
        quantity: Set(input.quantity),
        purchase_date: Set(input.purchase_date),
        unit_cost_price: Set(money(input.unit_cost_price)),
        total_price: Set(total_price),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(
        purchase_id = purchase.id,
        quantity = purchase.quantity,
        total_price = %purchase.total_price,
        "Purchase recorded"
    );
    Ok(purchase)
}

/// Lists `owner`'s purchases.
///
/// Search matches product and supplier names; ordering accepts `created_at` (default),
/// `updated_at`, `purchase_date` and `total_price`.
pub async fn list_purchases(
    db: &DatabaseConnection,
    owner: AccountId,
    params: &ListParams,
    filter: &PurchaseFilter,
    limits: PageLimits,
) -> Result<Page<purchase::Model>> {
    let mut select = Purchase::find()
        .join(JoinType::InnerJoin, purchase::Relation::Product.def())
        .join(JoinType::InnerJoin, purchase::Relation::Supplier.def())
        .filter(purchase::Column::OwnerId.eq(owner));

    if let Some(product_id) = filter.product_id {
        select = select.filter(purchase::Column::ProductId.eq(product_id));
    }
    if let Some(supplier_id) = filter.supplier_id {
        select = select.filter(purchase::Column::SupplierId.eq(supplier_id));
    }
    if let Some(date) = filter.purchase_date {
        select = select.filter(purchase::Column::PurchaseDate.eq(date));
    }
    if let Some(term) = params.search_term() {
        select = select.filter(
            Condition::any()
                .add(product::Column::Name.contains(term))
                .add(supplier::Column::Name.contains(term)),
        );
    }

    let (field, order) = params.ordering("created_at");
    let column = match field {
        "created_at" => purchase::Column::CreatedAt,
        "updated_at" => purchase::Column::UpdatedAt,
        "purchase_date" => purchase::Column::PurchaseDate,
        "total_price" => purchase::Column::TotalPrice,
        other => return Err(unknown_ordering(other, ORDERING_FIELDS)),
    };
    let select = select
        .order_by(column, order)
        .order_by_asc(purchase::Column::Id);

    fetch_page(db, select, params, limits).await
}

/// Replaces a purchase, moving stock according to `policy`.
///
/// # Errors
/// Same as [`record_purchase`], plus [`Error::PurchaseNotFound`] and
/// [`Error::InsufficientStock`] when lowering the quantity would take back units that
/// were already sold.
#[instrument(skip(db, input))]
pub async fn update_purchase(
    db: &DatabaseConnection,
    owner: AccountId,
    purchase_id: i64,
    input: PurchaseInput,
    policy: StockEditPolicy,
) -> Result<purchase::Model> {
    input.validate()?;
    let total_price = line_total(input.quantity, input.unit_cost_price)?;

    let txn = db.begin().await?;
    let existing = require_purchase(&txn, owner, purchase_id).await?;
    require_product(&txn, owner, input.product_id).await?;
    require_supplier(&txn, owner, input.supplier_id).await?;

    let adjustments =
        adjustments_for_edit(policy, Direction::Inbound, recorded_line(&existing), input.line());
    apply_adjustments(&txn, owner, &adjustments).await?;

    let mut purchase: purchase::ActiveModel = existing.into();
    purchase.product_id = Set(input.product_id);
    purchase.supplier_id = Set(input.supplier_id);
    purchase.quantity = Set(input.quantity);
    purchase.purchase_date = Set(input.purchase_date);
    purchase.unit_cost_price = Set(money(input.unit_cost_price));
    purchase.total_price = Set(total_price);
    purchase.updated_at = Set(chrono::Utc::now());
    let purchase = purchase.update(&txn).await?;

    txn.commit().await?;
    info!(purchase_id, ?policy, "Purchase updated");
    Ok(purchase)
}

/// Deletes a purchase; under [`StockEditPolicy::Delta`] its units leave stock again.
#[instrument(skip(db))]
pub async fn delete_purchase(
    db: &DatabaseConnection,
    owner: AccountId,
    purchase_id: i64,
    policy: StockEditPolicy,
) -> Result<()> {
    let txn = db.begin().await?;
    let existing = require_purchase(&txn, owner, purchase_id).await?;

    let adjustments = adjustments_for_removal(policy, Direction::Inbound, recorded_line(&existing));
    apply_adjustments(&txn, owner, &adjustments).await?;

    Purchase::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;
    info!(purchase_id, "Purchase deleted");
    Ok(())
}
