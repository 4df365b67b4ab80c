//! Categories are shared, so these handlers ignore the caller's account beyond
//! requiring one.

use crate::{
    api::{AppState, dto::CategoryResponse},
    core::{
        category::{self, CategoryFilter, CategoryInput},
        query::{ListParams, Page},
    },
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

/// Routes mounted under `/categories`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<Page<CategoryResponse>>> {
    let page = category::list_categories(state.database.as_ref(), &params, &filter, state.limits()).await?;
    Ok(Json(page.map(CategoryResponse::from)))
}

async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CategoryInput>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    let category = category::create_category(state.database.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>> {
    let category = category::get_category(state.database.as_ref(), id)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: id.to_string(),
        })?;
    Ok(Json(category.into()))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CategoryInput>,
) -> Result<Json<CategoryResponse>> {
    let category = category::update_category(state.database.as_ref(), id, body).await?;
    Ok(Json(category.into()))
}

async fn delete_category(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    category::delete_category(state.database.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
