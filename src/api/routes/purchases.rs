//! Stock goes up by the purchased quantity.
//! Edits and deletes move stock according to the configured `stock_edit_policy`.

use crate::{
    api::{AppState, auth::AccountContext, dto::PurchaseResponse},
    core::{
        purchase::{self, PurchaseFilter, PurchaseInput},
        query::{ListParams, Page},
    },
    errors::{Error, Result},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

/// Routes mounted under `/purchases`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchases).post(create_purchase))
        .route(
            "/:id",
            get(get_purchase).put(update_purchase).delete(delete_purchase),
        )
}

async fn list_purchases(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Query(params): Query<ListParams>,
    Query(filter): Query<PurchaseFilter>,
) -> Result<Json<Page<PurchaseResponse>>> {
    let page = purchase::list_purchases(
        state.database.as_ref(),
        account.account_id,
        &params,
        &filter,
        state.limits(),
    )
    .await?;
    Ok(Json(page.map(PurchaseResponse::from)))
}

async fn create_purchase(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Json(body): Json<PurchaseInput>,
) -> Result<(StatusCode, Json<PurchaseResponse>)> {
    let purchase = purchase::record_purchase(state.database.as_ref(), account.account_id, body).await?;
    Ok((StatusCode::CREATED, Json(purchase.into())))
}

async fn get_purchase(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<Json<PurchaseResponse>> {
    let purchase = purchase::get_purchase(state.database.as_ref(), account.account_id, id)
        .await?
        .ok_or(Error::PurchaseNotFound { id })?;
    Ok(Json(purchase.into()))
}

async fn update_purchase(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
    Json(body): Json<PurchaseInput>,
) -> Result<Json<PurchaseResponse>> {
    let purchase = purchase::update_purchase(
        state.database.as_ref(),
        account.account_id,
        id,
        body,
        state.stock_edit_policy(),
    )
    .await?;
    Ok(Json(purchase.into()))
}

async fn delete_purchase(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    purchase::delete_purchase(state.database.as_ref(), account.account_id, id, state.stock_edit_policy()).await?;
    Ok(StatusCode::NO_CONTENT)
}
