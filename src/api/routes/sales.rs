//! Stock goes down by the sold quantity; overselling is a 400.
//! Edits and deletes move stock according to the configured `stock_edit_policy`.

use crate::{
    api::{AppState, auth::AccountContext, dto::SaleResponse},
    core::{
        sale::{self, SaleFilter, SaleInput},
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

/// Routes mounted under `/sales`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route(
            "/:id",
            get(get_sale).put(update_sale).delete(delete_sale),
        )
}

async fn list_sales(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Query(params): Query<ListParams>,
    Query(filter): Query<SaleFilter>,
) -> Result<Json<Page<SaleResponse>>> {
    let page = sale::list_sales(
        state.database.as_ref(),
        account.account_id,
        &params,
        &filter,
        state.limits(),
    )
    .await?;
    Ok(Json(page.map(SaleResponse::from)))
}

async fn create_sale(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Json(body): Json<SaleInput>,
) -> Result<(StatusCode, Json<SaleResponse>)> {
    let sale = sale::record_sale(state.database.as_ref(), account.account_id, body).await?;
    Ok((StatusCode::CREATED, Json(sale.into())))
}

async fn get_sale(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<Json<SaleResponse>> {
    let sale = sale::get_sale(state.database.as_ref(), account.account_id, id)
        .await?
        .ok_or(Error::SaleNotFound { id })?;
    Ok(Json(sale.into()))
}

async fn update_sale(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
    Json(body): Json<SaleInput>,
) -> Result<Json<SaleResponse>> {
    let sale = sale::update_sale(
        state.database.as_ref(),
        account.account_id,
        id,
        body,
        state.stock_edit_policy(),
    )
    .await?;
    Ok(Json(sale.into()))
}

async fn delete_sale(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    sale::delete_sale(state.database.as_ref(), account.account_id, id, state.stock_edit_policy()).await?;
    Ok(StatusCode::NO_CONTENT)
}
