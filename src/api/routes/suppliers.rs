use crate::{
    api::{AppState, auth::AccountContext, dto::SupplierResponse},
    core::{
        supplier::{self, SupplierFilter, SupplierInput},
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

/// Routes mounted under `/suppliers`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

async fn list_suppliers(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Query(params): Query<ListParams>,
    Query(filter): Query<SupplierFilter>,
) -> Result<Json<Page<SupplierResponse>>> {
    let page = supplier::list_suppliers(
        state.database.as_ref(),
        account.account_id,
        &params,
        &filter,
        state.limits(),
    )
    .await?;
    Ok(Json(page.map(SupplierResponse::from)))
}

async fn create_supplier(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Json(body): Json<SupplierInput>,
) -> Result<(StatusCode, Json<SupplierResponse>)> {
    let supplier = supplier::create_supplier(state.database.as_ref(), account.account_id, body).await?;
    Ok((StatusCode::CREATED, Json(supplier.into())))
}

async fn get_supplier(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<Json<SupplierResponse>> {
    let supplier = supplier::get_supplier(state.database.as_ref(), account.account_id, id)
        .await?
        .ok_or(Error::SupplierNotFound { id })?;
    Ok(Json(supplier.into()))
}

async fn update_supplier(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
    Json(body): Json<SupplierInput>,
) -> Result<Json<SupplierResponse>> {
    let supplier = supplier::update_supplier(state.database.as_ref(), account.account_id, id, body).await?;
    Ok(Json(supplier.into()))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    supplier::delete_supplier(state.database.as_ref(), account.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
