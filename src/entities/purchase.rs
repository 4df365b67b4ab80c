//! Purchase entity - A ledger fact that added stock to a product.
//!
//! Each purchase has a `product_id`, `supplier_id`, quantity, purchase date, unit cost and a
//! derived `total_price` that is recomputed on every write.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    /// Unique identifier for the purchase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning account
    pub owner_id: i64,
    /// Product whose stock was increased
    pub product_id: i64,
    /// Supplier the goods came from
    pub supplier_id: i64,
    /// Units bought
    pub quantity: i32,
    /// Calendar date of the purchase
    pub purchase_date: Date,
    /// Cost per unit
    #[sea_orm(column_type = "Double")]
    pub unit_cost_price: Decimal,
    /// `quantity * unit_cost_price`
    #[sea_orm(column_type = "Double")]
    pub total_price: Decimal,
    /// When the purchase was recorded
    pub created_at: DateTimeUtc,
    /// When the purchase was last edited
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Purchase and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each purchase references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Each purchase references one supplier
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "Cascade"
    )]
    Supplier,
    /// Each purchase is owned by one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::OwnerId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
