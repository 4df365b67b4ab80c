//! Listing helpers shared by every resource: search term, ordering and page-number
//! pagination.

use crate::config::settings::Settings;
use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, EntityTrait, Order, PaginatorTrait, Select};
use serde::{Deserialize, Serialize};

/// Generic list parameters (`?search=..&ordering=-price&page=2&page_size=10`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring matched against the resource's search fields
    pub search: Option<String>,
    /// Field to order by, prefixed with `-` for descending
    pub ordering: Option<String>,
    /// 1-based page number
    pub page: Option<u64>,
    /// Rows per page
    pub page_size: Option<u64>,
}

impl ListParams {
    /// The trimmed search term, if a non-blank one was given.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Splits `ordering` into a field name and direction, falling back to `default`
    /// (ascending) when none was requested.
    #[must_use]
    pub fn ordering<'a>(&'a self, default: &'a str) -> (&'a str, Order) {
        let requested = self
            .ordering
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .unwrap_or(default);

        requested
            .strip_prefix('-')
            .map_or((requested, Order::Asc), |field| (field, Order::Desc))
    }
}

/// Builds the error returned for an ordering field a resource does not support.
#[must_use]
pub fn unknown_ordering(field: &str, allowed: &[&str]) -> Error {
    Error::validation(format!(
        "cannot order by '{field}', expected one of: {}",
        allowed.join(", ")
    ))
}

/// Page size bounds applied to every list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Used when the request has no `page_size`
    pub default_page_size: u64,
    /// Requested sizes are clamped to this
    pub max_page_size: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl From<&Settings> for PageLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            default_page_size: settings.default_page_size,
            max_page_size: settings.max_page_size,
        }
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Rows matching the query across all pages
    pub count: u64,
    /// Rows on this page
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Converts every row, keeping the count.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Rows skipped before `page`, if that offset is representable as a SQL `OFFSET`.
fn row_offset(page: u64, page_size: u64) -> Option<u64> {
    (page - 1)
        .checked_mul(page_size)
        .filter(|offset| i64::try_from(*offset).is_ok())
}

/// Runs `select` and returns the page requested by `params`.
///
/// Pages past the end come back empty rather than failing.
pub async fn fetch_page<'db, C, E>(
    db: &'db C,
    select: Select<E>,
    params: &ListParams,
    limits: PageLimits,
) -> Result<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Sync + 'db,
{
    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(Error::validation("page numbers start at 1"));
    }
    let page_size = params
        .page_size
        .unwrap_or(limits.default_page_size)
        .clamp(1, limits.max_page_size.max(1));
    if row_offset(page, page_size).is_none() {
        return Err(Error::validation(format!("page {page} is out of range")));
    }

    let paginator = select.paginate(db, page_size);
    let count = paginator.num_items().await?;
    let results = paginator.fetch_page(page - 1).await?;

    Ok(Page { count, results })
}
