//! HTTP API - axum router over the core ledger and CRUD operations.
//!
//! Layout:
//! - `routes/`: one file per resource, handlers stay thin and call into `core`
//! - `auth.rs`: bearer-token middleware
//! - `token.rs`: signing and verifying access/refresh tokens
//! - `dto.rs`: response bodies
//! - `errors.rs`: [`crate::errors::Error`] to status code mapping

pub mod auth;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod token;

use crate::{
    config::settings::Settings,
    core::{ledger::StockEditPolicy, query::PageLimits},
};
use token::JwtKeys;
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all database operations
    pub database: Arc<DatabaseConnection>,
    /// Settings loaded at startup
    pub settings: Arc<Settings>,
    /// Token keys derived from the settings
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    /// Creates the state from an open connection and loaded settings.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Arc<Settings>) -> Self {
        Self {
            database: Arc::new(database),
            jwt: Arc::new(JwtKeys::from_settings(&settings)),
            settings,
        }
    }

    /// Page size bounds for list endpoints.
    #[must_use]
    pub fn limits(&self) -> PageLimits {
        PageLimits::from(self.settings.as_ref())
    }

    /// How purchase/sale edits touch stock.
    #[must_use]
    pub fn stock_edit_policy(&self) -> StockEditPolicy {
        self.settings.stock_edit_policy
    }
}

/// Builds the full HTTP router.
///
/// `/health`, `/register` and the `/token` endpoints are public; everything else needs
/// an access token.
pub fn router(state: AppState) -> Router {
    let protected = routes::router().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth::require_account,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/register", post(routes::accounts::register))
        .route("/token", post(routes::accounts::login))
        .route("/token/refresh", post(routes::accounts::refresh))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
