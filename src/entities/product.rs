//! Product entity - Stock-keeping unit with a running stock counter.
//!
//! `quantity_in_stock` is only changed by the ledger (purchases add, sales remove)
//! or by an explicit product edit. Prices are decimals stored in a REAL column.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning account
    pub owner_id: i64,
    /// Category this product belongs to
    pub category_id: i64,
    /// Display name (e.g., "Laptop")
    pub name: String,
    /// Stock-keeping unit code, unique
    #[sea_orm(unique)]
    pub sku: String,
    /// Default unit sale price
    #[sea_orm(column_type = "Double")]
    pub price: Decimal,
    /// Units on hand, never negative
    pub quantity_in_stock: i32,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified (including stock changes)
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
    /// Each product is owned by one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::OwnerId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    /// One product appears in many purchases
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
    /// One product appears in many sales
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
