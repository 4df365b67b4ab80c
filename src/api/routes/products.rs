use crate::{
    api::{AppState, auth::AccountContext, dto::ProductResponse},
    core::{
        product::{self, ProductFilter, ProductInput},
        query::{ListParams, Page},
    },
    entities::ProductModel,
    errors::{Error, Result},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

/// Routes mounted under `/products`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn respond(state: &AppState, product: ProductModel) -> Result<Json<ProductResponse>> {
    let category = product::category_name(state.database.as_ref(), &product).await?;
    Ok(Json(ProductResponse::new(product, category)))
}

async fn list_products(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Query(params): Query<ListParams>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Page<ProductResponse>>> {
    let page = product::list_products(
        state.database.as_ref(),
        account.account_id,
        &params,
        &filter,
        state.limits(),
    )
    .await?;

    let mut names = product::category_names(state.database.as_ref(), &page.results).await?;
    Ok(Json(page.map(|p| {
        let category = names.remove(&p.category_id).unwrap_or_default();
        ProductResponse::new(p, category)
    })))
}

async fn create_product(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Json(body): Json<ProductInput>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let product = product::create_product(state.database.as_ref(), account.account_id, body).await?;
    Ok((StatusCode::CREATED, respond(&state, product).await?))
}

async fn get_product(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>> {
    let product = product::get_product(state.database.as_ref(), account.account_id, id)
        .await?
        .ok_or(Error::ProductNotFound { id })?;
    respond(&state, product).await
}

async fn update_product(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
    Json(body): Json<ProductInput>,
) -> Result<Json<ProductResponse>> {
    let product = product::update_product(state.database.as_ref(), account.account_id, id, body).await?;
    respond(&state, product).await
}

async fn delete_product(
    State(state): State<AppState>,
    Extension(account): Extension<AccountContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    product::delete_product(state.database.as_ref(), account.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
