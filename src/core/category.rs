//! Category business logic.
//!
//! Categories are shared between accounts and addressed by unique name from product
//! requests. Deleting a category removes its products.

use crate::{
    config::settings::CategorySeed,
    core::{
        optional_text,
        query::{ListParams, Page, PageLimits, fetch_page, unknown_ordering},
        require_text,
    },
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Fields accepted when creating or replacing a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    /// Unique name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Exact-match filters for category listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryFilter {
    /// Category name
    pub name: Option<String>,
}

/// Retrieves a category by id.
pub async fn get_category(db: &DatabaseConnection, category_id: i64) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its exact name.
pub async fn get_category_by_name<C>(db: &C, name: &str) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_category_by_name`] but treats a missing category as an error.
pub async fn require_category_by_name<C>(db: &C, name: &str) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    get_category_by_name(db, name)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: name.to_string(),
        })
}

/// Creates a category.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank name and [`Error::Conflict`] when the name is
/// already used.
pub async fn create_category(db: &DatabaseConnection, input: CategoryInput) -> Result<category::Model> {
    let name = require_text("name", &input.name)?;

    let category = category::ActiveModel {
        name: Set(name),
        description: Set(optional_text(input.description)),
        ..Default::default()
    };
    let category = category.insert(db).await?;
    info!(category_id = category.id, name = %category.name, "Category created");
    Ok(category)
}

/// Lists categories ordered by name (the only ordering field), with name search.
pub async fn list_categories(
    db: &DatabaseConnection,
    params: &ListParams,
    filter: &CategoryFilter,
    limits: PageLimits,
) -> Result<Page<category::Model>> {
    let mut select = Category::find();

    if let Some(name) = &filter.name {
        select = select.filter(category::Column::Name.eq(name.as_str()));
    }
    if let Some(term) = params.search_term() {
        select = select.filter(category::Column::Name.contains(term));
    }

    let (field, order) = params.ordering("name");
    if field != "name" {
        return Err(unknown_ordering(field, &["name"]));
    }
    let select = select
        .order_by(category::Column::Name, order)
        .order_by_asc(category::Column::Id);

    fetch_page(db, select, params, limits).await
}

/// Replaces a category's name and description.
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    input: CategoryInput,
) -> Result<category::Model> {
    let name = require_text("name", &input.name)?;

    let mut category: category::ActiveModel = get_category(db, category_id)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: category_id.to_string(),
        })?
        .into();

    category.name = Set(name);
    category.description = Set(optional_text(input.description));
    category.update(db).await.map_err(Into::into)
}

/// Deletes a category and, through the foreign key, all of its products.
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let result = Category::delete_by_id(category_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::CategoryNotFound {
            name: category_id.to_string(),
        });
    }
    info!(category_id, "Category deleted");
    Ok(())
}

/// Creates every configured category whose name is not taken yet.
///
/// Returns the number of categories created.
pub async fn seed_categories(db: &DatabaseConnection, seeds: &[CategorySeed]) -> Result<usize> {
    let mut created = 0;
    for seed in seeds {
        if get_category_by_name(db, &seed.name).await?.is_some() {
            continue;
        }
        create_category(
            db,
            CategoryInput {
                name: seed.name.clone(),
                description: seed.description.clone(),
            },
        )
        .await?;
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_category_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_category(
            &db,
            CategoryInput {
                name: "   ".to_string(),
                description: None,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_find_category() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_category(
            &db,
            CategoryInput {
                name: " Electronics ".to_string(),
                description: Some("  ".to_string()),
            },
        )
        .await?;
        assert_eq!(created.name, "Electronics");
        assert_eq!(created.description, None);

        let found = get_category_by_name(&db, "Electronics").await?.unwrap();
        assert_eq!(found, created);
        assert!(get_category_by_name(&db, "Missing").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_category_name_is_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Electronics").await?;

        let result = create_category(
            &db,
            CategoryInput {
                name: "Electronics".to_string(),
                description: None,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_categories_ordered_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Toys").await?;
        create_test_category(&db, "Books").await?;
        create_test_category(&db, "Electronics").await?;

        let page = list_categories(
            &db,
            &ListParams::default(),
            &CategoryFilter::default(),
            PageLimits::default(),
        )
        .await?;
        let names: Vec<_> = page.results.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Books", "Electronics", "Toys"]);

        let params = ListParams {
            ordering: Some("-name".to_string()),
            search: Some("o".to_string()),
            ..Default::default()
        };
        let page = list_categories(&db, &params, &CategoryFilter::default(), PageLimits::default()).await?;
        let names: Vec<_> = page.results.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Toys", "Electronics", "Books"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_cascades_to_products() -> Result<()> {
        let (db, account, product) = setup_with_product(5).await?;

        delete_category(&db, product.category_id).await?;

        let gone = crate::core::product::get_product(&db, account.id, product.id).await?;
        assert!(gone.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_categories_skips_existing() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Books").await?;

        let seeds = vec![
            CategorySeed {
                name: "Books".to_string(),
                description: None,
            },
            CategorySeed {
                name: "Toys".to_string(),
                description: Some("Fun".to_string()),
            },
        ];
        assert_eq!(seed_categories(&db, &seeds).await?, 1);
        assert_eq!(seed_categories(&db, &seeds).await?, 0);

        let toys = get_category_by_name(&db, "Toys").await?.unwrap();
        assert_eq!(toys.description.as_deref(), Some("Fun"));

        Ok(())
    }
}
