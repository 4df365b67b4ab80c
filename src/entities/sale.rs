//! Sale entity - A ledger fact that removed stock from a product.
//!
//! `sale_price` is always stored resolved: when the caller omits it the product's
//! price at the time of sale is written.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning account
    pub owner_id: i64,
    /// Product whose stock was reduced
    pub product_id: i64,
    /// Customer the goods went to
    pub customer_id: i64,
    /// Units sold
    pub quantity: i32,
    /// Calendar date of the sale
    pub sale_date: Date,
    /// Price per unit actually charged
    #[sea_orm(column_type = "Double")]
    pub sale_price: Decimal,
    /// `quantity * sale_price`
    #[sea_orm(column_type = "Double")]
    pub total_price: Decimal,
    /// When the sale was recorded
    pub created_at: DateTimeUtc,
    /// When the sale was last edited
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Each sale references one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "Cascade"
    )]
    Customer,
    /// Each sale is owned by one account
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

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
