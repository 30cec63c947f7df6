//! Recipe endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use foodgram_common::AppResult;
use foodgram_core::{
    CreateRecipeInput, IngredientAmountInput, RecipeIngredient, RecipeListQuery, RecipeView,
    UpdateRecipeInput, render_text,
};
use foodgram_db::{entities::recipe, repositories::LedgerEntry};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content, text_attachment},
};

const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// Recipe listing parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    /// Author ID.
    pub author: Option<String>,
    /// Comma-separated tag slugs.
    pub tags: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

impl From<ListRecipesQuery> for RecipeListQuery {
    fn from(query: ListRecipesQuery) -> Self {
        Self {
            author_id: query.author.filter(|a| !a.is_empty()),
            tags: query
                .tags
                .map(|tags| {
                    tags.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            is_favorited: is_set(query.is_favorited.as_deref()),
            is_in_shopping_cart: is_set(query.is_in_shopping_cart.as_deref()),
        }
    }
}

fn is_set(flag: Option<&str>) -> bool {
    matches!(flag, Some("1" | "true"))
}

/// Compact recipe, returned by favorite and cart actions.
#[derive(Serialize)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<recipe::Model> for RecipeSummary {
    fn from(recipe: recipe::Model) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Short link response.
#[derive(Serialize)]
pub struct ShortLinkResponse {
    pub short_link: String,
}

async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListRecipesQuery>,
) -> AppResult<ApiResponse<Vec<RecipeView>>> {
    let recipes = state
        .recipe_service
        .list(query.into(), viewer.id())
        .await?;
    Ok(ApiResponse::ok(recipes))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRecipeInput>,
) -> AppResult<impl IntoResponse> {
    let recipe = state.recipe_service.create(&user, input).await?;
    let view = state
        .recipe_service
        .detail(&recipe.id, Some(&user.id))
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(view)))
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RecipeView>> {
    let view = state.recipe_service.detail(&id, viewer.id()).await?;
    Ok(ApiResponse::ok(view))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRecipeInput>,
) -> AppResult<ApiResponse<RecipeView>> {
    state.recipe_service.update(&user, &id, input).await?;
    let view = state.recipe_service.detail(&id, Some(&user.id)).await?;
    Ok(ApiResponse::ok(view))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.recipe_service.delete(&user, &id).await?;
    Ok(no_content())
}

async fn ingredients(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<RecipeIngredient>>> {
    let ingredients = state.ledger_service.get_ingredients(&id).await?;
    Ok(ApiResponse::ok(ingredients))
}

/// Replace the whole ingredient list of a recipe.
async fn set_ingredients(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Vec<IngredientAmountInput>>,
) -> AppResult<ApiResponse<Vec<RecipeIngredient>>> {
    let entries: Vec<LedgerEntry> = input.iter().map(LedgerEntry::from).collect();
    state
        .recipe_service
        .set_ingredients(&user, &id, &entries)
        .await?;

    let ingredients = state.ledger_service.get_ingredients(&id).await?;
    Ok(ApiResponse::ok(ingredients))
}

async fn add_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let recipe = state.favorite_service.add(&user.id, &id).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(RecipeSummary::from(recipe))))
}

async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.favorite_service.remove(&user.id, &id).await?;
    Ok(no_content())
}

async fn add_to_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let recipe = state.shopping_cart_service.add(&user.id, &id).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(RecipeSummary::from(recipe))))
}

async fn remove_from_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.shopping_cart_service.remove(&user.id, &id).await?;
    Ok(no_content())
}

async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ShortLinkResponse>> {
    let short_link = state.recipe_service.short_link(&id).await?;
    Ok(ApiResponse::ok(ShortLinkResponse { short_link }))
}

/// Download the aggregated shopping list as a text file.
async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let lines = state.shopping_list_service.aggregate(&user.id).await?;
    Ok(text_attachment(SHOPPING_LIST_FILENAME, render_text(&lines)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route("/{id}", get(show).patch(update).delete(delete))
        .route("/{id}/ingredients", get(ingredients).put(set_ingredients))
        .route("/{id}/favorite", post(add_favorite).delete(remove_favorite))
        .route(
            "/{id}/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
        .route("/{id}/get-link", get(get_link))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_parsing() {
        let query: RecipeListQuery = ListRecipesQuery {
            author: Some("user1".to_string()),
            tags: Some("breakfast, dinner,,".to_string()),
            is_favorited: Some("1".to_string()),
            is_in_shopping_cart: Some("0".to_string()),
        }
        .into();

        assert_eq!(query.author_id.as_deref(), Some("user1"));
        assert_eq!(query.tags, vec!["breakfast", "dinner"]);
        assert!(query.is_favorited);
        assert!(!query.is_in_shopping_cart);
    }

    #[test]
    fn test_empty_list_query() {
        let query: RecipeListQuery = ListRecipesQuery::default().into();

        assert!(query.author_id.is_none());
        assert!(query.tags.is_empty());
        assert!(!query.is_favorited);
    }
}
