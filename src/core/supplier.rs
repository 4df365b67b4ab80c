//! Supplier business logic - owner-scoped contact records that purchases point at.

use crate::{
    core::{
        AccountId, optional_text,
        query::{ListParams, Page, PageLimits, fetch_page, unknown_ordering},
        require_email, require_text,
    },
    entities::{Supplier, supplier},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;

const ORDERING_FIELDS: &[&str] = &["created_at", "updated_at", "name"];

/// Fields accepted when creating or replacing a supplier.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    /// Supplier name
    pub name: String,
    /// Contact email
    pub contact_email: String,
    /// Optional phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional postal address
    #[serde(default)]
    pub address: Option<String>,
}

/// Exact-match filters for supplier listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierFilter {
    /// Supplier name
    pub name: Option<String>,
}

/// Finds a supplier owned by `owner`.
pub async fn get_supplier<C>(
    db: &C,
    owner: AccountId,
    supplier_id: i64,
) -> Result<Option<supplier::Model>>
where
    C: ConnectionTrait,
{
    Supplier::find_by_id(supplier_id)
        .filter(supplier::Column::OwnerId.eq(owner))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_supplier`] but treats a missing supplier as [`Error::SupplierNotFound`].
pub async fn require_supplier<C>(
    db: &C,
    owner: AccountId,
    supplier_id: i64,
) -> Result<supplier::Model>
where
    C: ConnectionTrait,
{
    get_supplier(db, owner, supplier_id)
        .await?
        .ok_or(Error::SupplierNotFound { id: supplier_id })
}

/// Creates a supplier for `owner`.
pub async fn create_supplier(
    db: &DatabaseConnection,
    owner: AccountId,
    input: SupplierInput,
) -> Result<supplier::Model> {
    let name = require_text("name", &input.name)?;
    let contact_email = require_email("contact_email", &input.contact_email)?;

    let now = chrono::Utc::now();
    let supplier = supplier::ActiveModel {
        owner_id: Set(owner),
        name: Set(name),
        contact_email: Set(contact_email),
        phone: Set(optional_text(input.phone)),
        address: Set(optional_text(input.address)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    supplier.insert(db).await.map_err(Into::into)
}

/// Lists `owner`'s suppliers with name search; ordering `created_at` (default),
/// `updated_at` or `name`.
pub async fn list_suppliers(
    db: &DatabaseConnection,
    owner: AccountId,
    params: &ListParams,
    filter: &SupplierFilter,
    limits: PageLimits,
) -> Result<Page<supplier::Model>> {
    let mut select = Supplier::find().filter(supplier::Column::OwnerId.eq(owner));

    if let Some(name) = &filter.name {
        select = select.filter(supplier::Column::Name.eq(name.as_str()));
    }
    if let Some(term) = params.search_term() {
        select = select.filter(supplier::Column::Name.contains(term));
    }

    let (field, order) = params.ordering("created_at");
    let column = match field {
        "created_at" => supplier::Column::CreatedAt,
        "updated_at" => supplier::Column::UpdatedAt,
        "name" => supplier::Column::Name,
        other => return Err(unknown_ordering(other, ORDERING_FIELDS)),
    };
    let select = select
        .order_by(column, order)
        .order_by_asc(supplier::Column::Id);

    fetch_page(db, select, params, limits).await
}

/// Replaces every editable field of a supplier.
pub async fn update_supplier(
    db: &DatabaseConnection,
    owner: AccountId,
    supplier_id: i64,
    input: SupplierInput,
) -> Result<supplier::Model> {
    let name = require_text("name", &input.name)?;
    let contact_email = require_email("contact_email", &input.contact_email)?;

    let mut supplier: supplier::ActiveModel =
        require_supplier(db, owner, supplier_id).await?.into();
    supplier.name = Set(name);
    supplier.contact_email = Set(contact_email);
    supplier.phone = Set(optional_text(input.phone));
    supplier.address = Set(optional_text(input.address));
    supplier.updated_at = Set(chrono::Utc::now());

    supplier.update(db).await.map_err(Into::into)
}

/// Deletes a supplier and every purchase made from them.
pub async fn delete_supplier(db: &DatabaseConnection, owner: AccountId, supplier_id: i64) -> Result<()> {
    let result = Supplier::delete_many()
        .filter(supplier::Column::Id.eq(supplier_id))
        .filter(supplier::Column::OwnerId.eq(owner))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::SupplierNotFound { id: supplier_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn input(name: &str) -> SupplierInput {
        SupplierInput {
            name: name.to_string(),
            contact_email: "test@email.com".to_string(),
            phone: Some("02394943".to_string()),
            address: Some("Testovo, Testova str. 25".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_supplier_requires_contact_email() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;

        let result = create_supplier(
            &db,
            account.id,
            SupplierInput {
                contact_email: "nope".to_string(),
                ..input("Test")
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_supplier_crud_is_owner_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;
        let other = create_test_account(&db, "user2").await?;

        let supplier = create_supplier(&db, account.id, input("Test")).await?;
        assert_eq!(supplier.contact_email, "test@email.com");

        assert!(get_supplier(&db, other.id, supplier.id).await?.is_none());
        let result = delete_supplier(&db, other.id, supplier.id).await;
        assert!(matches!(result.unwrap_err(), Error::SupplierNotFound { id: _ }));

        let updated = update_supplier(&db, account.id, supplier.id, input("Renamed")).await?;
        assert_eq!(updated.name, "Renamed");
        assert!(updated.updated_at >= supplier.updated_at);

        delete_supplier(&db, account.id, supplier.id).await?;
        assert!(get_supplier(&db, account.id, supplier.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_suppliers_ordering_by_name_desc() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;
        create_supplier(&db, account.id, input("Alpha")).await?;
        create_supplier(&db, account.id, input("Beta")).await?;

        let params = ListParams {
            ordering: Some("-name".to_string()),
            ..Default::default()
        };
        let page = list_suppliers(&db, account.id, &params, &SupplierFilter::default(), PageLimits::default()).await?;
        assert_eq!(page.results[0].name, "Beta");
        assert_eq!(page.results[1].name, "Alpha");

        Ok(())
    }
}
