//! Response bodies.
//!
//! Entity models carry `owner_id` and store money as floating point; these types drop the
//! owner and rescale every amount so it serializes as a two-digit decimal string.

// Field names mirror the JSON keys
#![allow(missing_docs)]

use crate::{
    api::token::TokenPair,
    core::ledger::money,
    entities::{account, category, customer, product, purchase, sale, supplier},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Registration logs the new account straight in.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub username: String,
    pub access: String,
    pub refresh: String,
}

impl RegisterResponse {
    pub fn new(account: account::Model, tokens: TokenPair) -> Self {
        Self {
            user_id: account.id,
            username: account.username,
            access: tokens.access,
            refresh: tokens.refresh,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access: tokens.access,
            refresh: tokens.refresh,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<category::Model> for CategoryResponse {
    fn from(category: category::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}

/// Products name their category instead of exposing its id.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn new(product: product::Model, category: String) -> Self {
        Self {
            id: product.id,
            name: product.name,
            sku: product.sku,
            price: money(product.price),
            quantity_in_stock: product.quantity_in_stock,
            category,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<customer::Model> for CustomerResponse {
    fn from(customer: customer::Model) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SupplierResponse {
    pub id: i64,
    pub name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<supplier::Model> for SupplierResponse {
    fn from(supplier: supplier::Model) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name,
            contact_email: supplier.contact_email,
            phone: supplier.phone,
            address: supplier.address,
            created_at: supplier.created_at,
            updated_at: supplier.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub id: i64,
    pub product_id: i64,
    pub supplier_id: i64,
    pub quantity: i32,
    pub purchase_date: NaiveDate,
    pub unit_cost_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<purchase::Model> for PurchaseResponse {
    fn from(purchase: purchase::Model) -> Self {
        Self {
            id: purchase.id,
            product_id: purchase.product_id,
            supplier_id: purchase.supplier_id,
            quantity: purchase.quantity,
            purchase_date: purchase.purchase_date,
            unit_cost_price: money(purchase.unit_cost_price),
            total_price: money(purchase.total_price),
            created_at: purchase.created_at,
            updated_at: purchase.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub id: i64,
    pub product_id: i64,
    pub customer_id: i64,
    pub quantity: i32,
    pub sale_date: NaiveDate,
    pub sale_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<sale::Model> for SaleResponse {
    fn from(sale: sale::Model) -> Self {
        Self {
            id: sale.id,
            product_id: sale.product_id,
            customer_id: sale.customer_id,
            quantity: sale.quantity,
            sale_date: sale.sale_date,
            sale_price: money(sale.sale_price),
            total_price: money(sale.total_price),
            created_at: sale.created_at,
            updated_at: sale.updated_at,
        }
    }
}
