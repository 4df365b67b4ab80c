//! Product business logic - Handles all product-related operations.
//!
//! Products are owned by an account and reference a shared category by name. Stock
//! normally moves through purchases and sales; an explicit product update may also set it
//! (a manual stock correction), but never below zero.

use crate::{
    core::{
        AccountId,
        category::require_category_by_name,
        ledger::{self, validate_price},
        query::{ListParams, Page, PageLimits, fetch_page, unknown_ordering},
        require_text,
    },
    entities::{Category, Product, category, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{
    Condition, ConnectionTrait, JoinType, QueryOrder, QuerySelect, Set, prelude::*,
};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

const ORDERING_FIELDS: &[&str] = &["created_at", "updated_at", "name", "price"];

/// Fields accepted when creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    /// Display name
    pub name: String,
    /// Unique stock-keeping unit code
    pub sku: String,
    /// Default unit sale price
    pub price: Decimal,
    /// Units on hand
    pub quantity_in_stock: i32,
    /// Category name
    pub category: String,
}

/// Exact-match filters for product listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Product name
    pub name: Option<String>,
    /// Stock-keeping unit
    pub sku: Option<String>,
    /// Category name
    pub category: Option<String>,
}

struct ValidProduct {
    name: String,
    sku: String,
    price: Decimal,
    quantity_in_stock: i32,
}

fn validate(input: &ProductInput) -> Result<ValidProduct> {
    let name = require_text("name", &input.name)?;
    let sku = require_text("sku", &input.sku)?;
    validate_price(input.price)?;
    if input.quantity_in_stock < 0 {
        return Err(Error::validation("quantity_in_stock cannot be negative"));
    }

    Ok(ValidProduct {
        name,
        sku,
        price: ledger::money(input.price),
        quantity_in_stock: input.quantity_in_stock,
    })
}

/// Finds a product owned by `owner`, returning None if it does not exist or belongs to
/// another account.
pub async fn get_product<C>(
    db: &C,
    owner: AccountId,
    product_id: i64,
) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .filter(product::Column::OwnerId.eq(owner))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_product`] but treats a missing product as [`Error::ProductNotFound`].
pub async fn require_product<C>(
    db: &C,
    owner: AccountId,
    product_id: i64,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    get_product(db, owner, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Creates a product for `owner` in the named category.
///
/// # Errors
/// Returns an error if:
/// - name or sku is blank, price is negative, or stock is negative
/// - the category does not exist
/// - the sku is already taken ([`Error::Conflict`])
pub async fn create_product(
    db: &DatabaseConnection,
    owner: AccountId,
    input: ProductInput,
) -> Result<product::Model> {
    let valid = validate(&input)?;
    let category = require_category_by_name(db, &input.category).await?;

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        owner_id: Set(owner),
        category_id: Set(category.id),
        name: Set(valid.name),
        sku: Set(valid.sku),
        price: Set(valid.price),
        quantity_in_stock: Set(valid.quantity_in_stock),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    info!(product_id = product.id, sku = %product.sku, "Product created");
    Ok(product)
}

/// Lists `owner`'s products.
///
/// Search matches name, sku and category name; ordering accepts `created_at` (default),
/// `updated_at`, `name` and `price`.
pub async fn list_products(
    db: &DatabaseConnection,
    owner: AccountId,
    params: &ListParams,
    filter: &ProductFilter,
    limits: PageLimits,
) -> Result<Page<product::Model>> {
    let mut select = Product::find()
        .join(JoinType::InnerJoin, product::Relation::Category.def())
        .filter(product::Column::OwnerId.eq(owner));

    if let Some(name) = &filter.name {
        select = select.filter(product::Column::Name.eq(name.as_str()));
    }
    if let Some(sku) = &filter.sku {
        select = select.filter(product::Column::Sku.eq(sku.as_str()));
    }
    if let Some(category) = &filter.category {
        select = select.filter(category::Column::Name.eq(category.as_str()));
    }
    if let Some(term) = params.search_term() {
        select = select.filter(
            Condition::any()
                .add(product::Column::Name.contains(term))
                .add(product::Column::Sku.contains(term))
                .add(category::Column::Name.contains(term)),
        );
    }

    let (field, order) = params.ordering("created_at");
    let column = match field {
        "created_at" => product::Column::CreatedAt,
        "updated_at" => product::Column::UpdatedAt,
        "name" => product::Column::Name,
        "price" => product::Column::Price,
        other => return Err(unknown_ordering(other, ORDERING_FIELDS)),
    };
    let select = select
        .order_by(column, order)
        .order_by_asc(product::Column::Id);

    fetch_page(db, select, params, limits).await
}

/// Replaces every editable field of an existing product.
///
/// # Errors
/// Same as [`create_product`], plus [`Error::ProductNotFound`].
pub async fn update_product(
    db: &DatabaseConnection,
    owner: AccountId,
    product_id: i64,
    input: ProductInput,
) -> Result<product::Model> {
    let valid = validate(&input)?;
    let category = require_category_by_name(db, &input.category).await?;
    let existing = require_product(db, owner, product_id).await?;

    if existing.quantity_in_stock != valid.quantity_in_stock {
        info!(
            product_id,
            from = existing.quantity_in_stock,
            to = valid.quantity_in_stock,
            "Manual stock correction"
        );
    }

    let mut product: product::ActiveModel = existing.into();
    product.category_id = Set(category.id);
    product.name = Set(valid.name);
    product.sku = Set(valid.sku);
    product.price = Set(valid.price);
    product.quantity_in_stock = Set(valid.quantity_in_stock);
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Deletes a product together with every purchase and sale that references it.
pub async fn delete_product(db: &DatabaseConnection, owner: AccountId, product_id: i64) -> Result<()> {
    let result = Product::delete_many()
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::OwnerId.eq(owner))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ProductNotFound { id: product_id });
    }
    info!(product_id, "Product deleted");
    Ok(())
}

/// Name of the category a product belongs to.
pub async fn category_name<C>(db: &C, product: &product::Model) -> Result<String>
where
    C: ConnectionTrait,
{
    Category::find_by_id(product.category_id)
        .one(db)
        .await?
        .map(|c| c.name)
        .ok_or_else(|| Error::CategoryNotFound {
            name: product.category_id.to_string(),
        })
}

/// Category names for a batch of products, keyed by category id.
pub async fn category_names<C>(db: &C, products: &[product::Model]) -> Result<HashMap<i64, String>>
where
    C: ConnectionTrait,
{
    let ids: Vec<i64> = products.iter().map(|p| p.category_id).collect();
    let categories = Category::find()
        .filter(category::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(categories.into_iter().map(|c| (c.id, c.name)).collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn input(name: &str, sku: &str, price: Decimal, stock: i32) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            sku: sku.to_string(),
            price,
            quantity_in_stock: stock,
            category: "Electronics".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Empty name
        let result = create_product(&db, 1, input("  ", "SKU", dec!(1.00), 0)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        // Empty sku
        let result = create_product(&db, 1, input("Laptop", "", dec!(1.00), 0)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        // Negative price
        let result = create_product(&db, 1, input("Laptop", "SKU", dec!(-1.00), 0)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidPrice { price: _ }));

        // Negative stock
        let result = create_product(&db, 1, input("Laptop", "SKU", dec!(1.00), -1)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;
        create_test_category(&db, "Electronics").await?;

        let product = create_product(&db, account.id, input("Laptop", "ABC123", dec!(1200), 10)).await?;

        assert_eq!(product.name, "Laptop");
        assert_eq!(product.sku, "ABC123");
        assert_eq!(product.price, dec!(1200.00));
        assert_eq!(product.quantity_in_stock, 10);
        assert_eq!(product.owner_id, account.id);
        assert_eq!(category_name(&db, &product).await?, "Electronics");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_unknown_category() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;

        let result = create_product(&db, account.id, input("Laptop", "ABC123", dec!(1), 1)).await;
        assert!(matches!(result.unwrap_err(), Error::CategoryNotFound { name: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;
        create_test_category(&db, "Electronics").await?;

        create_product(&db, account.id, input("Laptop", "ABC123", dec!(1), 1)).await?;
        let result = create_product(&db, account.id, input("Other", "ABC123", dec!(1), 1)).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_product_is_owner_scoped() -> Result<()> {
        let (db, account, product) = setup_with_product(10).await?;
        let other = create_test_account(&db, "user2").await?;

        assert!(get_product(&db, account.id, product.id).await?.is_some());
        assert!(get_product(&db, other.id, product.id).await?.is_none());
        assert!(matches!(
            require_product(&db, other.id, product.id).await.unwrap_err(),
            Error::ProductNotFound { id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_search_filter_and_ordering() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;
        let other = create_test_account(&db, "user2").await?;
        create_test_category(&db, "Electronics").await?;

        create_product(&db, account.id, input("Laptop", "LAP-1", dec!(1200), 1)).await?;
        create_product(&db, account.id, input("Mouse", "MOU-1", dec!(25), 1)).await?;
        create_product(&db, other.id, input("Laptop", "LAP-2", dec!(900), 1)).await?;

        // Only the caller's rows
        let page = list_products(
            &db,
            account.id,
            &ListParams::default(),
            &ProductFilter::default(),
            PageLimits::default(),
        )
        .await?;
        assert_eq!(page.count, 2);

        // Search by sku fragment
        let params = ListParams {
            search: Some("mou".to_string()),
            ..Default::default()
        };
        let page = list_products(&db, account.id, &params, &ProductFilter::default(), PageLimits::default()).await?;
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].name, "Mouse");

        // Search by category name matches both
        let params = ListParams {
            search: Some("electro".to_string()),
            ..Default::default()
        };
        let page = list_products(&db, account.id, &params, &ProductFilter::default(), PageLimits::default()).await?;
        assert_eq!(page.count, 2);

        // Descending price
        let params = ListParams {
            ordering: Some("-price".to_string()),
            ..Default::default()
        };
        let page = list_products(&db, account.id, &params, &ProductFilter::default(), PageLimits::default()).await?;
        assert_eq!(page.results[0].name, "Laptop");
        assert_eq!(page.results[1].name, "Mouse");

        // Exact filter
        let filter = ProductFilter {
            sku: Some("LAP-1".to_string()),
            ..Default::default()
        };
        let page = list_products(&db, account.id, &ListParams::default(), &filter, PageLimits::default()).await?;
        assert_eq!(page.count, 1);

        // Unknown ordering
        let params = ListParams {
            ordering: Some("owner_id".to_string()),
            ..Default::default()
        };
        let result = list_products(&db, account.id, &params, &ProductFilter::default(), PageLimits::default()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_pagination() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;
        create_test_category(&db, "Electronics").await?;
        for i in 0..5 {
            create_product(&db, account.id, input(&format!("P{i}"), &format!("SKU-{i}"), dec!(1), 1)).await?;
        }

        let params = ListParams {
            page: Some(2),
            page_size: Some(2),
            ordering: Some("name".to_string()),
            ..Default::default()
        };
        let page = list_products(&db, account.id, &params, &ProductFilter::default(), PageLimits::default()).await?;
        assert_eq!(page.count, 5);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].name, "P2");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_integration() -> Result<()> {
        let (db, account, product) = setup_with_product(10).await?;
        create_test_category(&db, "Books").await?;

        let updated = update_product(
            &db,
            account.id,
            product.id,
            ProductInput {
                name: "Notebook".to_string(),
                sku: product.sku.clone(),
                price: dec!(15.50),
                quantity_in_stock: 4,
                category: "Books".to_string(),
            },
        )
        .await?;

        assert_eq!(updated.name, "Notebook");
        assert_eq!(updated.price, dec!(15.50));
        assert_eq!(updated.quantity_in_stock, 4);
        assert_eq!(category_name(&db, &updated).await?, "Books");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_integration() -> Result<()> {
        let (db, account, product) = setup_with_product(10).await?;
        let other = create_test_account(&db, "user2").await?;

        // Another account cannot delete it
        let result = delete_product(&db, other.id, product.id).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: _ }));

        delete_product(&db, account.id, product.id).await?;
        assert!(get_product(&db, account.id, product.id).await?.is_none());

        Ok(())
    }
}
