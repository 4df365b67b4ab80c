//! Customer business logic - owner-scoped contact records that sales point at.

use crate::{
    core::{
        AccountId, optional_text,
        query::{ListParams, Page, PageLimits, fetch_page, unknown_ordering},
        require_email, require_text,
    },
    entities::{Customer, customer},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;

const ORDERING_FIELDS: &[&str] = &["created_at", "updated_at", "name"];

/// Fields accepted when creating or replacing a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerInput {
    /// Customer name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Optional phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional postal address
    #[serde(default)]
    pub address: Option<String>,
}

/// Exact-match filters for customer listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    /// Customer name
    pub name: Option<String>,
}

/// Finds a customer owned by `owner`.
pub async fn get_customer<C>(
    db: &C,
    owner: AccountId,
    customer_id: i64,
) -> Result<Option<customer::Model>>
where
    C: ConnectionTrait,
{
    Customer::find_by_id(customer_id)
        .filter(customer::Column::OwnerId.eq(owner))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_customer`] but treats a missing customer as [`Error::CustomerNotFound`].
pub async fn require_customer<C>(
    db: &C,
    owner: AccountId,
    customer_id: i64,
) -> Result<customer::Model>
where
    C: ConnectionTrait,
{
    get_customer(db, owner, customer_id)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer_id })
}

/// Creates a customer for `owner`.
pub async fn create_customer(
    db: &DatabaseConnection,
    owner: AccountId,
    input: CustomerInput,
) -> Result<customer::Model> {
    let name = require_text("name", &input.name)?;
    let email = require_email("email", &input.email)?;

    let now = chrono::Utc::now();
    let customer = customer::ActiveModel {
        owner_id: Set(owner),
        name: Set(name),
        email: Set(email),
        phone: Set(optional_text(input.phone)),
        address: Set(optional_text(input.address)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    customer.insert(db).await.map_err(Into::into)
}

/// Lists `owner`'s customers with name search; ordering `created_at` (default),
/// `updated_at` or `name`.
pub async fn list_customers(
    db: &DatabaseConnection,
    owner: AccountId,
    params: &ListParams,
    filter: &CustomerFilter,
    limits: PageLimits,
) -> Result<Page<customer::Model>> {
    let mut select = Customer::find().filter(customer::Column::OwnerId.eq(owner));

    if let Some(name) = &filter.name {
        select = select.filter(customer::Column::Name.eq(name.as_str()));
    }
    if let Some(term) = params.search_term() {
        select = select.filter(customer::Column::Name.contains(term));
    }

    let (field, order) = params.ordering("created_at");
    let column = match field {
        "created_at" => customer::Column::CreatedAt,
        "updated_at" => customer::Column::UpdatedAt,
        "name" => customer::Column::Name,
        other => return Err(unknown_ordering(other, ORDERING_FIELDS)),
    };
    let select = select
        .order_by(column, order)
        .order_by_asc(customer::Column::Id);

    fetch_page(db, select, params, limits).await
}

/// Replaces every editable field of a customer.
pub async fn update_customer(
    db: &DatabaseConnection,
    owner: AccountId,
    customer_id: i64,
    input: CustomerInput,
) -> Result<customer::Model> {
    let name = require_text("name", &input.name)?;
    let email = require_email("email", &input.email)?;

    let mut customer: customer::ActiveModel =
        require_customer(db, owner, customer_id).await?.into();
    customer.name = Set(name);
    customer.email = Set(email);
    customer.phone = Set(optional_text(input.phone));
    customer.address = Set(optional_text(input.address));
    customer.updated_at = Set(chrono::Utc::now());

    customer.update(db).await.map_err(Into::into)
}

/// Deletes a customer and every sale made to them.
pub async fn delete_customer(db: &DatabaseConnection, owner: AccountId, customer_id: i64) -> Result<()> {
    let result = Customer::delete_many()
        .filter(customer::Column::Id.eq(customer_id))
        .filter(customer::Column::OwnerId.eq(owner))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::CustomerNotFound { id: customer_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn input(name: &str, email: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: Some("02394943".to_string()),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_customer_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_customer(&db, 1, input("", "a@a.bg")).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = create_customer(&db, 1, input("Test Customer", "not-an-email")).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_crud_is_owner_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;
        let other = create_test_account(&db, "user2").await?;

        let customer = create_customer(&db, account.id, input("Test Customer", "t@t.bg")).await?;
        assert_eq!(customer.phone.as_deref(), Some("02394943"));

        assert!(get_customer(&db, other.id, customer.id).await?.is_none());
        let page = list_customers(
            &db,
            other.id,
            &ListParams::default(),
            &CustomerFilter::default(),
            PageLimits::default(),
        )
        .await?;
        assert_eq!(page.count, 0);

        let result = update_customer(&db, other.id, customer.id, input("Hijack", "h@h.bg")).await;
        assert!(matches!(result.unwrap_err(), Error::CustomerNotFound { id: _ }));

        let updated = update_customer(&db, account.id, customer.id, input("Renamed", "r@r.bg")).await?;
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "r@r.bg");

        delete_customer(&db, account.id, customer.id).await?;
        assert!(get_customer(&db, account.id, customer.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_customers_filter_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1").await?;
        create_customer(&db, account.id, input("Alice", "a@a.bg")).await?;
        create_customer(&db, account.id, input("Bob", "b@b.bg")).await?;

        let filter = CustomerFilter {
            name: Some("Bob".to_string()),
        };
        let page = list_customers(&db, account.id, &ListParams::default(), &filter, PageLimits::default()).await?;
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].name, "Bob");

        Ok(())
    }
}
