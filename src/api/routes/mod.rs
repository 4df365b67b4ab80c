//! Route table for authenticated endpoints, one module per resource.

use crate::api::AppState;
use axum::Router;

pub mod accounts;
pub mod categories;
pub mod customers;
pub mod products;
pub mod purchases;
pub mod sales;
pub mod suppliers;
pub mod system;

/// Router for all authenticated (account-scoped) endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .nest("/suppliers", suppliers::router())
        .nest("/purchases", purchases::router())
        .nest("/sales", sales::router())
}
