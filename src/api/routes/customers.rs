use crate::{
    api::{AppState, auth::AccountContext, dto::CustomerResponse},
    core::{
        customer::{self, CustomerFilter, CustomerInput},
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

/// Routes mounted under `/customers`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

async fn list_customers(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Query(params): Query<ListParams>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Json<Page<CustomerResponse>>> {
    let page = customer::list_customers(
        state.database.as_ref(),
        account.account_id,
        &params,
        &filter,
        state.limits(),
    )
    .await?;
    Ok(Json(page.map(CustomerResponse::from)))
}

async fn create_customer(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Json(body): Json<CustomerInput>,
) -> Result<(StatusCode, Json<CustomerResponse>)> {
    let customer = customer::create_customer(state.database.as_ref(), account.account_id, body).await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

async fn get_customer(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerResponse>> {
    let customer = customer::get_customer(state.database.as_ref(), account.account_id, id)
        .await?
        .ok_or(Error::CustomerNotFound { id })?;
    Ok(Json(customer.into()))
}

async fn update_customer(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
    Json(body): Json<CustomerInput>,
) -> Result<Json<CustomerResponse>> {
    let customer = customer::update_customer(state.database.as_ref(), account.account_id, id, body).await?;
    Ok(Json(customer.into()))
}

async fn delete_customer(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    customer::delete_customer(state.database.as_ref(), account.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
