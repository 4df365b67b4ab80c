//! Shared test utilities for `StockBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        AccountId,
        account::{self, RegisterInput},
        category::{self, CategoryInput},
        customer::{self, CustomerInput},
        product::{self, ProductInput},
        supplier::{self, SupplierInput},
    },
    entities::{self, Product},
    errors::{Error, Result},
};
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, EntityTrait};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers an account with `<username>@example.com` as email and password `password`.
pub async fn create_test_account(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::account::Model> {
    account::register_account(
        db,
        RegisterInput {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "password".to_string(),
        },
    )
    .await
}

/// Creates a category without a description.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        CategoryInput {
            name: name.to_string(),
            description: None,
        },
    )
    .await
}

/// Creates a product in the "Electronics" category, which must already exist.
///
/// # Defaults
/// * price: 1200.00
pub async fn create_test_product(
    db: &DatabaseConnection,
    owner: AccountId,
    name: &str,
    sku: &str,
    quantity_in_stock: i32,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        owner,
        ProductInput {
            name: name.to_string(),
            sku: sku.to_string(),
            price: dec!(1200.00),
            quantity_in_stock,
            category: "Electronics".to_string(),
        },
    )
    .await
}

/// Creates a supplier with a fixed contact email.
pub async fn create_test_supplier(
    db: &DatabaseConnection,
    owner: AccountId,
    name: &str,
) -> Result<entities::supplier::Model> {
    supplier::create_supplier(
        db,
        owner,
        SupplierInput {
            name: name.to_string(),
            contact_email: "test@email.com".to_string(),
            phone: None,
            address: None,
        },
    )
    .await
}

/// Creates a customer with a fixed email.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    owner: AccountId,
    name: &str,
) -> Result<entities::customer::Model> {
    customer::create_customer(
        db,
        owner,
        CustomerInput {
            name: name.to_string(),
            email: "test@email.com".to_string(),
            phone: None,
            address: None,
        },
    )
    .await
}

/// Current stock of a product, read straight from the table.
pub async fn stock_of(db: &DatabaseConnection, product_id: i64) -> Result<i32> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .map(|p| p.quantity_in_stock)
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Sets up a complete test environment with one account owning one product.
/// Returns (db, account, product): a "Laptop" with sku "ABC123" priced 1200.00.
pub async fn setup_with_product(
    quantity_in_stock: i32,
) -> Result<(
    DatabaseConnection,
    entities::account::Model,
    entities::product::Model,
)> {
    let db = setup_test_db().await?;
    let account = create_test_account(&db, "user1").await?;
    create_test_category(&db, "Electronics").await?;
    let product = create_test_product(&db, account.id, "Laptop", "ABC123", quantity_in_stock).await?;
    Ok((db, account, product))
}
