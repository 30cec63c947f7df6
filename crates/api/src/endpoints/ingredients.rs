//! Ingredient endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use foodgram_common::AppResult;
use foodgram_db::entities::ingredient;
use serde::Deserialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Ingredient search parameters.
#[derive(Debug, Deserialize)]
pub struct ListIngredientsQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListIngredientsQuery>,
) -> AppResult<ApiResponse<Vec<ingredient::Model>>> {
    let ingredients = state
        .ingredient_service
        .list(query.name.as_deref())
        .await?;
    Ok(ApiResponse::ok(ingredients))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ingredient::Model>> {
    let ingredient = state.ingredient_service.get(&id).await?;
    Ok(ApiResponse::ok(ingredient))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
}
